//! HTTP side of the flow: token exchange and profile fetch share this client.

use crate::descriptor::ProviderDescriptor;
use crate::session::AccessToken;
use shield_identity_core::{
    HttpRequest, HttpResponse, HttpTransport, IdentityError, IdentityResult,
};
use std::sync::Arc;
use tracing::error;
use url::Url;

/// Talks to one provider's endpoints through the injected transport.
#[derive(Clone)]
pub struct OAuth2Client {
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) descriptor: ProviderDescriptor,
}

impl OAuth2Client {
    pub fn new(transport: Arc<dyn HttpTransport>, descriptor: ProviderDescriptor) -> Self {
        Self {
            transport,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// Authenticated GET against a profile endpoint.
    pub(crate) fn api_get(&self, url: &Url, token: &AccessToken) -> HttpRequest {
        HttpRequest::get(url.as_str())
            .header("User-Agent", self.descriptor.user_agent.as_str())
            .header("Accept", self.descriptor.profile_media_type.as_str())
            .header("Authorization", format!("Bearer {}", token.secret()))
    }

    pub(crate) async fn send(&self, request: HttpRequest) -> IdentityResult<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();

        self.transport.send(request).await.map_err(|e| {
            error!(
                provider = %self.descriptor.provider_id,
                %method,
                %url,
                timed_out = e.is_timeout(),
                "HTTP request failed: {}",
                e
            );
            IdentityError::Transport(e)
        })
    }
}
