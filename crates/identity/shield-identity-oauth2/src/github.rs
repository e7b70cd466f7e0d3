//! GitHub OAuth App dialect.

use crate::descriptor::{ProviderDescriptor, parse_endpoint};
use crate::dialect::ProfileDialect;
use crate::types::{EmailCandidate, RawProfile};
use serde::Deserialize;
use shield_identity_core::{IdentityError, IdentityResult};

const AUTHORIZATION_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
const TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
const USERINFO_ENDPOINT: &str = "https://api.github.com/user";
const EMAIL_LIST_ENDPOINT: &str = "https://api.github.com/user/emails";

/// `GET /user`. `email` is only the publicly visible address and is `null`
/// for most accounts.
#[derive(Debug, Deserialize)]
struct GithubUser {
    login: Option<String>,
    email: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
}

/// `GET /user/emails` entry; lists private addresses too.
#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    #[serde(default)]
    primary: Option<bool>,
    verified: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GithubEmailsBody {
    List(Vec<GithubEmail>),
    Error { message: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GithubDialect;

impl ProfileDialect for GithubDialect {
    fn provider_id(&self) -> &'static str {
        "github"
    }

    fn descriptor(&self, user_agent: &str) -> IdentityResult<ProviderDescriptor> {
        Ok(ProviderDescriptor {
            provider_id: self.provider_id().to_string(),
            authorization_endpoint: parse_endpoint("authorization_endpoint", AUTHORIZATION_ENDPOINT)?,
            token_endpoint: parse_endpoint("token_endpoint", TOKEN_ENDPOINT)?,
            userinfo_endpoint: parse_endpoint("userinfo_endpoint", USERINFO_ENDPOINT)?,
            email_list_endpoint: Some(parse_endpoint("email_list_endpoint", EMAIL_LIST_ENDPOINT)?),
            scope: "user:email".to_string(),
            profile_media_type: "application/vnd.github+json".to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    fn parse_profile(&self, body: &str) -> IdentityResult<RawProfile> {
        let user: GithubUser = serde_json::from_str(body)
            .map_err(|e| IdentityError::ProfileParse(format!("GitHub user: {}", e)))?;

        Ok(RawProfile {
            login: user.login,
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
        })
    }

    fn parse_email_list(&self, body: &str) -> IdentityResult<Vec<EmailCandidate>> {
        let parsed: GithubEmailsBody = serde_json::from_str(body)
            .map_err(|e| IdentityError::ProfileParse(format!("GitHub emails: {}", e)))?;

        match parsed {
            GithubEmailsBody::List(emails) => Ok(emails
                .into_iter()
                .map(|entry| EmailCandidate {
                    address: entry.email,
                    is_primary: entry.primary.unwrap_or(false),
                    is_verified: entry.verified,
                })
                .collect()),
            GithubEmailsBody::Error { message } => Err(IdentityError::ProfileParse(format!(
                "GitHub emails endpoint returned an error: {}",
                message
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_with_null_email() {
        let profile = GithubDialect
            .parse_profile(
                r#"{"login":"octocat","id":1,"email":null,"name":"The Octocat","avatar_url":"https://github.com/images/error/octocat_happy.gif"}"#,
            )
            .unwrap();

        assert_eq!(profile.login.as_deref(), Some("octocat"));
        assert_eq!(profile.email, None);
        assert_eq!(profile.name.as_deref(), Some("The Octocat"));
    }

    #[test]
    fn test_error_body_parses_as_empty_profile() {
        let profile = GithubDialect
            .parse_profile(r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/rest"}"#)
            .unwrap();

        assert_eq!(profile, RawProfile::default());
    }

    #[test]
    fn test_parse_email_list_keeps_order() {
        let emails = GithubDialect
            .parse_email_list(
                r#"[
                    {"email":"a@x.com","primary":false,"verified":true,"visibility":null},
                    {"email":"b@x.com","primary":true,"verified":true,"visibility":"private"}
                ]"#,
            )
            .unwrap();

        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].address, "a@x.com");
        assert!(!emails[0].is_primary);
        assert!(emails[1].is_primary);
        assert_eq!(emails[1].is_verified, Some(true));
    }

    #[test]
    fn test_null_primary_is_not_primary() {
        let emails = GithubDialect
            .parse_email_list(r#"[{"email":"a@x.com","primary":null}]"#)
            .unwrap();

        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].address, "a@x.com");
        assert!(!emails[0].is_primary);
        assert_eq!(emails[0].is_verified, None);
    }

    #[test]
    fn test_email_list_error_body() {
        let result = GithubDialect.parse_email_list(r#"{"message":"Not Found"}"#);
        match result {
            Err(IdentityError::ProfileParse(message)) => assert!(message.contains("Not Found")),
            other => panic!("Expected ProfileParse, got: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_profile() {
        assert!(matches!(
            GithubDialect.parse_profile("<html>rate limited</html>"),
            Err(IdentityError::ProfileParse(_))
        ));
    }
}
