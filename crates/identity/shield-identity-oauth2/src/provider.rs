//! OAuth2 identity provider implementation.

use crate::client::OAuth2Client;
use crate::config::{ClientCredentials, OAuth2Config};
use crate::descriptor::ProviderDescriptor;
use crate::dialect::{ProfileDialect, dialect_for};
use crate::github::GithubDialect;
use crate::google::GoogleDialect;
use crate::link::build_authorization_link;
use crate::normalize::identity_from_profile;
use crate::session::{LoginState, OAuthSession};
use crate::types::RawProfile;
use async_trait::async_trait;
use shield_identity_core::{
    HttpTransport, IdentityError, IdentityProvider, IdentityResult, NormalizedIdentity,
    ProviderRegistry,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A configured provider.
///
/// Immutable and shareable: per-login state lives in the [`LoginAttempt`]s it
/// hands out, one per `complete_login` call.
#[derive(Clone)]
pub struct OAuth2Provider {
    client: OAuth2Client,
    credentials: ClientCredentials,
    dialect: Arc<dyn ProfileDialect>,
}

impl OAuth2Provider {
    pub fn new(
        dialect: Arc<dyn ProfileDialect>,
        descriptor: ProviderDescriptor,
        credentials: ClientCredentials,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            client: OAuth2Client::new(transport, descriptor),
            credentials,
            dialect,
        }
    }

    /// Build a provider from configuration. Credentials are resolved here, so
    /// a missing client id or secret fails before any request is made.
    pub fn from_config(
        dialect: Arc<dyn ProfileDialect>,
        config: &OAuth2Config,
        transport: Arc<dyn HttpTransport>,
    ) -> IdentityResult<Self> {
        let provider_id = dialect.provider_id();
        let settings = config.provider_settings(provider_id)?;
        let credentials = config.credentials(provider_id)?;
        let descriptor = dialect
            .descriptor(&config.user_agent())?
            .with_overrides(settings)?;

        Ok(Self::new(dialect, descriptor, credentials, transport))
    }

    pub fn github(config: &OAuth2Config, transport: Arc<dyn HttpTransport>) -> IdentityResult<Self> {
        Self::from_config(Arc::new(GithubDialect), config, transport)
    }

    pub fn google(config: &OAuth2Config, transport: Arc<dyn HttpTransport>) -> IdentityResult<Self> {
        Self::from_config(Arc::new(GoogleDialect), config, transport)
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        self.client.descriptor()
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Fresh attempt with its own session.
    pub fn begin_attempt(&self) -> LoginAttempt<'_> {
        LoginAttempt {
            provider: self,
            session: OAuthSession::new(self.credentials.callback_url().clone()),
        }
    }

    fn authorization_link(&self, state: &str) -> String {
        let descriptor = self.descriptor();
        build_authorization_link(
            &descriptor.authorization_endpoint,
            self.credentials.client_id(),
            self.credentials.callback_url().as_str(),
            &descriptor.scope,
            state,
        )
    }
}

#[async_trait]
impl IdentityProvider for OAuth2Provider {
    fn provider_id(&self) -> &str {
        &self.descriptor().provider_id
    }

    fn build_authorization_link(&self, state: &str) -> String {
        self.authorization_link(state)
    }

    async fn complete_login(
        &self,
        callback_params: &HashMap<String, String>,
    ) -> IdentityResult<NormalizedIdentity> {
        self.begin_attempt().complete(callback_params).await
    }
}

/// One login attempt: the session plus the pipeline steps that drive it.
///
/// Every step that fails moves the session to [`LoginState::Failed`], after
/// which no further step is accepted.
pub struct LoginAttempt<'a> {
    provider: &'a OAuth2Provider,
    session: OAuthSession,
}

impl LoginAttempt<'_> {
    pub fn session(&self) -> &OAuthSession {
        &self.session
    }

    pub fn state(&self) -> &LoginState {
        self.session.state()
    }

    /// Link for redirecting the user; the attempt then awaits the callback.
    ///
    /// May be called again while awaiting the callback, e.g. with a new
    /// state. Once a token was acquired it fails with `InvalidState`.
    pub fn authorization_link(&mut self, state: &str) -> IdentityResult<String> {
        let result = self.session.transition(LoginState::AwaitingCallback);
        self.record(result)?;
        Ok(self.provider.authorization_link(state))
    }

    /// Exchange the code and store the token in the session.
    pub async fn exchange_code_for_token(&mut self, code: &str) -> IdentityResult<()> {
        let result = self.session.check_transition(&LoginState::TokenAcquired);
        self.record(result)?;

        let result = self
            .provider
            .client
            .exchange_code(&self.provider.credentials, code)
            .await
            .and_then(|token| self.session.store_token(token));
        self.record(result)
    }

    pub async fn fetch_profile(&mut self) -> IdentityResult<RawProfile> {
        let result = self.session.check_transition(&LoginState::ProfileResolved);
        self.record(result)?;

        let result = match self.session.access_token() {
            Ok(token) => {
                self.provider
                    .client
                    .fetch_profile(self.provider.dialect.as_ref(), token)
                    .await
            }
            Err(e) => Err(e),
        };
        let profile = self.record(result)?;

        let result = self.session.transition(LoginState::ProfileResolved);
        self.record(result)?;
        Ok(profile)
    }

    pub fn finish(&mut self, profile: RawProfile) -> IdentityResult<NormalizedIdentity> {
        let result = self
            .session
            .check_transition(&LoginState::Normalized)
            .and_then(|_| identity_from_profile(self.provider.dialect.provider_id(), profile));
        let identity = self.record(result)?;

        let result = self.session.transition(LoginState::Normalized);
        self.record(result)?;
        Ok(identity)
    }

    /// Run the whole pipeline from the redirect's query parameters.
    pub async fn complete(
        mut self,
        callback_params: &HashMap<String, String>,
    ) -> IdentityResult<NormalizedIdentity> {
        let result = authorization_code(callback_params);
        let code = self.record(result)?;

        self.exchange_code_for_token(code).await?;
        let profile = self.fetch_profile().await?;
        let identity = self.finish(profile)?;

        info!(
            provider = %self.provider.descriptor().provider_id,
            login = %identity.login_handle,
            "Completed OAuth2 login"
        );
        Ok(identity)
    }

    fn record<T>(&mut self, result: IdentityResult<T>) -> IdentityResult<T> {
        if let Err(e) = &result {
            warn!(
                provider = %self.provider.descriptor().provider_id,
                state = %self.session.state(),
                "OAuth2 login attempt failed: {}",
                e
            );
            self.session.fail(e.to_string());
        }
        result
    }
}

fn authorization_code(callback_params: &HashMap<String, String>) -> IdentityResult<&str> {
    if let Some(error) = callback_params.get("error") {
        let description = callback_params
            .get("error_description")
            .map(String::as_str)
            .unwrap_or("No description");
        return Err(IdentityError::Callback(format!("{}: {}", error, description)));
    }

    callback_params
        .get("code")
        .map(String::as_str)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| IdentityError::Callback("Missing authorization code".to_string()))
}

/// Build a registry with every provider present in the configuration.
pub fn registry_from_config(
    config: &OAuth2Config,
    transport: Arc<dyn HttpTransport>,
) -> IdentityResult<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();

    for provider_id in config.providers.keys() {
        let dialect = dialect_for(provider_id)?;
        let provider = OAuth2Provider::from_config(dialect, config, transport.clone())?;
        registry.register(Arc::new(provider));
    }

    Ok(registry)
}
