//! Authorization code → access token.

use crate::client::OAuth2Client;
use crate::config::ClientCredentials;
use crate::session::AccessToken;
use crate::types::TokenResponse;
use shield_identity_core::{HttpRequest, IdentityError, IdentityResult};
use tracing::{debug, info, warn};

impl OAuth2Client {
    /// Exchange an authorization code for an access token.
    ///
    /// One POST, no retry. A body without a usable `access_token` means the
    /// provider rejected the code and is reported as `TokenExchange`, distinct
    /// from transport failures.
    pub async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
    ) -> IdentityResult<AccessToken> {
        let request = HttpRequest::post(self.descriptor.token_endpoint.as_str())
            .header("User-Agent", self.descriptor.user_agent.as_str())
            .header("Accept", "application/json")
            .form_param("client_id", credentials.client_id())
            .form_param("client_secret", credentials.client_secret())
            .form_param("code", code)
            .form_param("redirect_uri", credentials.callback_url().as_str())
            .form_param("grant_type", "authorization_code");

        debug!(provider = %self.descriptor.provider_id, "Exchanging authorization code");
        let response = self.send(request).await?;

        let token_response: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            warn!(
                provider = %self.descriptor.provider_id,
                status = response.status,
                "Token endpoint returned an unparsable body"
            );
            IdentityError::TokenExchange(format!(
                "unparsable token response (HTTP {}): {}",
                response.status, e
            ))
        })?;

        let reason = token_response.rejection_reason(response.status);
        match token_response.access_token.filter(|token| !token.is_empty()) {
            Some(token) => {
                info!(provider = %self.descriptor.provider_id, "Exchanged code for access token");
                Ok(AccessToken::new(token))
            }
            None => {
                warn!(
                    provider = %self.descriptor.provider_id,
                    status = response.status,
                    "Token exchange rejected: {}",
                    reason
                );
                Err(IdentityError::TokenExchange(reason))
            }
        }
    }
}
