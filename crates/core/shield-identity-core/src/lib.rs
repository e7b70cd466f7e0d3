//! Core identity provider traits and types.
//!
//! Everything here is provider agnostic: the error kinds every login attempt
//! can end with, the HTTP capability the protocol code is written against,
//! the normalized identity handed to the host's user storage, and the
//! caller-facing [`IdentityProvider`] contract.

mod error;
mod registry;
mod transport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use error::{IdentityError, IdentityResult, TransportError};
pub use registry::ProviderRegistry;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

/// Provider-agnostic user record produced by a completed login.
///
/// `login_handle` and `email` are always non-empty. `display_name` and
/// `avatar_url` are empty strings when the provider does not publish them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedIdentity {
    pub provider_id: String,
    pub login_handle: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
}

/// The contract the host application programs against.
///
/// Adding a provider means adding an implementation; callers only ever see
/// this trait (usually through a [`ProviderRegistry`]).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    /// URL the user agent should be redirected to. `state` is echoed back by
    /// the provider and must be verified by the caller.
    fn build_authorization_link(&self, state: &str) -> String;

    /// Finish a login from the query parameters of the provider's redirect.
    async fn complete_login(
        &self,
        callback_params: &HashMap<String, String>,
    ) -> IdentityResult<NormalizedIdentity>;
}
