//! Profile fetch with the email fallback.

use crate::client::OAuth2Client;
use crate::dialect::ProfileDialect;
use crate::session::AccessToken;
use crate::types::{EmailCandidate, RawProfile};
use shield_identity_core::{IdentityError, IdentityResult};
use tracing::{debug, warn};

impl OAuth2Client {
    /// Fetch the user profile, resolving an email address when it is hidden.
    ///
    /// Error statuses are not failures here: the body is handed to the dialect
    /// either way. The email-list endpoint is only queried when the profile
    /// has no email, and the returned profile always carries one.
    pub async fn fetch_profile(
        &self,
        dialect: &dyn ProfileDialect,
        token: &AccessToken,
    ) -> IdentityResult<RawProfile> {
        let provider = &self.descriptor.provider_id;

        let response = self
            .send(self.api_get(&self.descriptor.userinfo_endpoint, token))
            .await?;
        if !response.is_success() {
            debug!(%provider, status = response.status, "User info endpoint returned an error status");
        }

        let mut profile = dialect.parse_profile(&response.body)?;
        if profile.has_email() {
            return Ok(profile);
        }

        let Some(endpoint) = &self.descriptor.email_list_endpoint else {
            warn!(%provider, "Profile has no email and provider has no email list");
            return Err(IdentityError::NoEmailFound);
        };

        debug!(%provider, "Profile has no public email, querying email list");
        let response = self.send(self.api_get(endpoint, token)).await?;
        let candidates = dialect.parse_email_list(&response.body)?;

        let address = select_email(&candidates)
            .map(|candidate| candidate.address.as_str())
            .filter(|address| !address.is_empty())
            .ok_or_else(|| {
                warn!(%provider, "No email addresses found for the user");
                IdentityError::NoEmailFound
            })?;

        profile.email = Some(address.to_string());
        Ok(profile)
    }
}

/// First primary entry, otherwise the first entry, in provider order.
pub fn select_email(candidates: &[EmailCandidate]) -> Option<&EmailCandidate> {
    candidates
        .iter()
        .find(|candidate| candidate.is_primary)
        .or_else(|| candidates.first())
}
