//! OAuth2 configuration types.

use crate::normalize::FieldMapping;
use serde::{Deserialize, Serialize};
use shield_identity_core::{IdentityError, IdentityResult};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Client configuration for one provider.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub client_id: String,
    pub client_secret: String,
    /// Overrides the provider's default scope
    pub scope: Option<String>,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub userinfo_endpoint: Option<String>,
    pub email_list_endpoint: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("scope", &self.scope)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("userinfo_endpoint", &self.userinfo_endpoint)
            .field("email_list_endpoint", &self.email_list_endpoint)
            .finish()
    }
}

/// OAuth2 client configuration, loaded once before any provider is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuth2Config {
    /// Sent as `User-Agent: <application_name>/1.0`
    pub application_name: String,
    /// Public base URL of the host application
    pub base_url: String,
    /// Callback URL is `<base_url>/oauth/<call_back_route>`
    pub call_back_route: String,
    pub http_timeout_seconds: u64,
    pub providers: HashMap<String, ProviderSettings>,
    /// Host column names for the normalized display attributes
    pub users_columns_name: FieldMapping,
}

impl Default for OAuth2Config {
    fn default() -> Self {
        Self {
            application_name: "ShieldOAuth".to_string(),
            base_url: String::new(),
            call_back_route: "callback".to_string(),
            http_timeout_seconds: 10,
            providers: HashMap::new(),
            users_columns_name: FieldMapping::default(),
        }
    }
}

impl OAuth2Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_provider(mut self, provider_id: impl Into<String>, settings: ProviderSettings) -> Self {
        self.providers.insert(provider_id.into(), settings);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn user_agent(&self) -> String {
        crate::descriptor::user_agent(&self.application_name)
    }

    pub fn callback_url(&self) -> IdentityResult<Url> {
        if self.base_url.trim().is_empty() {
            return Err(IdentityError::Configuration(
                "base_url is not configured".to_string(),
            ));
        }

        let raw = format!(
            "{}/oauth/{}",
            self.base_url.trim_end_matches('/'),
            self.call_back_route.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| {
            IdentityError::Configuration(format!("Invalid callback URL '{}': {}", raw, e))
        })
    }

    pub fn provider_settings(&self, provider_id: &str) -> IdentityResult<&ProviderSettings> {
        self.providers.get(provider_id).ok_or_else(|| {
            IdentityError::Configuration(format!("Provider '{}' not configured", provider_id))
        })
    }

    /// Resolve the client credentials of a provider, failing fast on gaps.
    pub fn credentials(&self, provider_id: &str) -> IdentityResult<ClientCredentials> {
        let settings = self.provider_settings(provider_id)?;
        ClientCredentials::new(
            settings.client_id.clone(),
            settings.client_secret.clone(),
            self.callback_url()?,
        )
    }
}

/// Client id, secret and callback URL of one provider.
///
/// The secret is only ever written into the token request body.
#[derive(Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
    callback_url: Url,
}

impl ClientCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: Url,
    ) -> IdentityResult<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() {
            return Err(IdentityError::Configuration(
                "client_id is not configured".to_string(),
            ));
        }
        if client_secret.trim().is_empty() {
            return Err(IdentityError::Configuration(
                "client_secret is not configured".to_string(),
            ));
        }

        Ok(Self {
            client_id,
            client_secret,
            callback_url,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn callback_url(&self) -> &Url {
        &self.callback_url
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("callback_url", &self.callback_url.as_str())
            .finish()
    }
}
