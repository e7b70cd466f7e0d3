//! Static per-provider endpoint data.

use crate::config::ProviderSettings;
use shield_identity_core::{IdentityError, IdentityResult};
use url::Url;

/// Endpoints and request metadata of one identity provider.
///
/// Built once at configuration time, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub provider_id: String,
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    pub userinfo_endpoint: Url,
    /// Queried only when the profile response carries no email.
    pub email_list_endpoint: Option<Url>,
    pub scope: String,
    /// `Accept` header sent to the profile endpoints.
    pub profile_media_type: String,
    pub user_agent: String,
}

impl ProviderDescriptor {
    /// Replace endpoints and scope with whatever the settings override.
    pub fn with_overrides(mut self, settings: &ProviderSettings) -> IdentityResult<Self> {
        if let Some(endpoint) = &settings.authorization_endpoint {
            self.authorization_endpoint = parse_endpoint("authorization_endpoint", endpoint)?;
        }
        if let Some(endpoint) = &settings.token_endpoint {
            self.token_endpoint = parse_endpoint("token_endpoint", endpoint)?;
        }
        if let Some(endpoint) = &settings.userinfo_endpoint {
            self.userinfo_endpoint = parse_endpoint("userinfo_endpoint", endpoint)?;
        }
        if let Some(endpoint) = &settings.email_list_endpoint {
            self.email_list_endpoint = Some(parse_endpoint("email_list_endpoint", endpoint)?);
        }
        if let Some(scope) = &settings.scope {
            self.scope = scope.clone();
        }
        Ok(self)
    }
}

/// `User-Agent` value for an application name.
pub(crate) fn user_agent(application_name: &str) -> String {
    format!("{}/1.0", application_name)
}

pub(crate) fn parse_endpoint(field: &str, value: &str) -> IdentityResult<Url> {
    Url::parse(value)
        .map_err(|e| IdentityError::Configuration(format!("Invalid {} '{}': {}", field, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GithubDialect, ProfileDialect};

    #[test]
    fn test_overrides_replace_endpoints() {
        let descriptor = GithubDialect.descriptor("ShieldOAuth/1.0").unwrap();
        let settings = ProviderSettings {
            token_endpoint: Some("http://127.0.0.1:9000/token".to_string()),
            email_list_endpoint: Some("http://127.0.0.1:9000/emails".to_string()),
            scope: Some("read:user user:email".to_string()),
            ..ProviderSettings::default()
        };

        let descriptor = descriptor.with_overrides(&settings).unwrap();

        assert_eq!(descriptor.token_endpoint.as_str(), "http://127.0.0.1:9000/token");
        assert_eq!(
            descriptor.email_list_endpoint.as_ref().map(Url::as_str),
            Some("http://127.0.0.1:9000/emails")
        );
        assert_eq!(
            descriptor.authorization_endpoint.as_str(),
            "https://github.com/login/oauth/authorize"
        );
        assert_eq!(descriptor.scope, "read:user user:email");
    }

    #[test]
    fn test_invalid_override_is_configuration_error() {
        let descriptor = GithubDialect.descriptor("ShieldOAuth/1.0").unwrap();
        let settings = ProviderSettings {
            userinfo_endpoint: Some("not a url".to_string()),
            ..ProviderSettings::default()
        };

        let result = descriptor.with_overrides(&settings);
        assert!(matches!(result, Err(IdentityError::Configuration(_))));
    }

    #[test]
    fn test_user_agent_format() {
        assert_eq!(user_agent("ShieldOAuth"), "ShieldOAuth/1.0");
    }
}
