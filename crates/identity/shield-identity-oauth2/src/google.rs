//! Google OAuth2 dialect.

use crate::descriptor::{ProviderDescriptor, parse_endpoint};
use crate::dialect::ProfileDialect;
use crate::types::RawProfile;
use serde::Deserialize;
use shield_identity_core::{IdentityError, IdentityResult};

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v1/userinfo";

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Google has no username, so the email address doubles as login handle.
/// The `email` scope always yields an address; there is no email-list endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleDialect;

impl ProfileDialect for GoogleDialect {
    fn provider_id(&self) -> &'static str {
        "google"
    }

    fn descriptor(&self, user_agent: &str) -> IdentityResult<ProviderDescriptor> {
        Ok(ProviderDescriptor {
            provider_id: self.provider_id().to_string(),
            authorization_endpoint: parse_endpoint("authorization_endpoint", AUTHORIZATION_ENDPOINT)?,
            token_endpoint: parse_endpoint("token_endpoint", TOKEN_ENDPOINT)?,
            userinfo_endpoint: parse_endpoint("userinfo_endpoint", USERINFO_ENDPOINT)?,
            email_list_endpoint: None,
            scope: "openid email profile".to_string(),
            profile_media_type: "application/json".to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    fn parse_profile(&self, body: &str) -> IdentityResult<RawProfile> {
        let info: GoogleUserInfo = serde_json::from_str(body)
            .map_err(|e| IdentityError::ProfileParse(format!("Google userinfo: {}", e)))?;

        Ok(RawProfile {
            login: info.email.clone(),
            email: info.email,
            name: info.name,
            avatar_url: info.picture,
        })
    }
}
