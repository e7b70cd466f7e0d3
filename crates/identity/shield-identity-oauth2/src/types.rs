//! OAuth2 protocol types.

use serde::Deserialize;

/// Token endpoint response.
///
/// Every field is optional: GitHub reports a rejected code with HTTP 200 and
/// an `error` body instead of a token.
#[derive(Default, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Why the response carries no usable token.
    pub fn rejection_reason(&self, status: u16) -> String {
        match (&self.error, &self.error_description) {
            (Some(error), Some(description)) => format!("{}: {}", error, description),
            (Some(error), None) => error.clone(),
            _ => format!("response (HTTP {}) carried no access_token", status),
        }
    }
}

/// Provider-neutral view of a user profile, before validation.
///
/// Produced by a [`ProfileDialect`](crate::ProfileDialect) from the provider's
/// own typed response. Fields the provider did not send are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProfile {
    pub login: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl RawProfile {
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|email| !email.is_empty())
    }
}

/// One entry of a provider's email-list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCandidate {
    pub address: String,
    pub is_primary: bool,
    pub is_verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reason_prefers_provider_error() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
        )
        .unwrap();

        assert_eq!(
            response.rejection_reason(200),
            "bad_verification_code: The code passed is incorrect or expired."
        );
        assert_eq!(
            TokenResponse::default().rejection_reason(400),
            "response (HTTP 400) carried no access_token"
        );
    }

    #[test]
    fn test_empty_email_is_missing() {
        let mut profile = RawProfile::default();
        assert!(!profile.has_email());

        profile.email = Some(String::new());
        assert!(!profile.has_email());

        profile.email = Some("octocat@github.com".to_string());
        assert!(profile.has_email());
    }
}
