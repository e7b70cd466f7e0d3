//! `reqwest`-backed HTTP transport.

use async_trait::async_trait;
use reqwest::Client;
use shield_identity_core::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, IdentityError, IdentityResult,
    TransportError,
};
use std::time::Duration;
use tracing::debug;

/// Default transport. Every call is bounded by the client timeout; nothing is
/// retried.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> IdentityResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            IdentityError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;
        Ok(Self { client })
    }

    /// Wrap an existing client, keeping whatever timeouts it was built with.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        debug!(method = %request.method, url = %request.url, status, "HTTP request completed");
        Ok(HttpResponse { status, body })
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::timeout(err.to_string())
    } else {
        TransportError::new(err.to_string())
    }
}
