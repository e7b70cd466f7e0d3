//! Per-provider strategy: default endpoints and response shapes.

use crate::descriptor::ProviderDescriptor;
use crate::github::GithubDialect;
use crate::google::GoogleDialect;
use crate::types::{EmailCandidate, RawProfile};
use shield_identity_core::{IdentityError, IdentityResult};
use std::sync::Arc;

/// What a concrete provider has to supply on top of the shared protocol code.
pub trait ProfileDialect: Send + Sync {
    fn provider_id(&self) -> &'static str;

    /// Default descriptor for this provider.
    fn descriptor(&self, user_agent: &str) -> IdentityResult<ProviderDescriptor>;

    /// Parse the user-info response body, whatever its HTTP status was.
    fn parse_profile(&self, body: &str) -> IdentityResult<RawProfile>;

    /// Parse the email-list response body, in provider order.
    ///
    /// Dialects whose descriptor has no email-list endpoint keep the default.
    fn parse_email_list(&self, _body: &str) -> IdentityResult<Vec<EmailCandidate>> {
        Ok(Vec::new())
    }
}

/// Built-in dialect for a provider id.
pub fn dialect_for(provider_id: &str) -> IdentityResult<Arc<dyn ProfileDialect>> {
    match provider_id {
        "github" => Ok(Arc::new(GithubDialect)),
        "google" => Ok(Arc::new(GoogleDialect)),
        other => Err(IdentityError::ProviderNotFound(other.to_string())),
    }
}
