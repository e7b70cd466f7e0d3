//! Per-attempt login state.

use shield_identity_core::{IdentityError, IdentityResult};
use std::fmt;
use url::Url;

/// Opaque bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Unstarted,
    AwaitingCallback,
    TokenAcquired,
    ProfileResolved,
    Normalized,
    Failed(String),
}

impl LoginState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoginState::Normalized | LoginState::Failed(_))
    }

    fn allows(&self, next: &LoginState) -> bool {
        use LoginState::*;

        match (self, next) {
            (Unstarted | AwaitingCallback, AwaitingCallback) => true,
            (Unstarted | AwaitingCallback, TokenAcquired) => true,
            (TokenAcquired, ProfileResolved) => true,
            (ProfileResolved, Normalized) => true,
            (current, Failed(_)) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginState::Unstarted => f.write_str("unstarted"),
            LoginState::AwaitingCallback => f.write_str("awaiting callback"),
            LoginState::TokenAcquired => f.write_str("token acquired"),
            LoginState::ProfileResolved => f.write_str("profile resolved"),
            LoginState::Normalized => f.write_str("normalized"),
            LoginState::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// Token slot and state machine of a single login attempt.
///
/// The token is stored at most once and dies with the session.
#[derive(Debug)]
pub struct OAuthSession {
    callback_url: Url,
    access_token: Option<AccessToken>,
    state: LoginState,
}

impl OAuthSession {
    pub fn new(callback_url: Url) -> Self {
        Self {
            callback_url,
            access_token: None,
            state: LoginState::Unstarted,
        }
    }

    pub fn callback_url(&self) -> &Url {
        &self.callback_url
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn access_token(&self) -> IdentityResult<&AccessToken> {
        self.access_token.as_ref().ok_or_else(|| {
            IdentityError::InvalidState("no access token has been acquired".to_string())
        })
    }

    pub(crate) fn check_transition(&self, next: &LoginState) -> IdentityResult<()> {
        if self.state.allows(next) {
            Ok(())
        } else {
            Err(IdentityError::InvalidState(format!(
                "cannot move from {} to {}",
                self.state, next
            )))
        }
    }

    pub(crate) fn transition(&mut self, next: LoginState) -> IdentityResult<()> {
        self.check_transition(&next)?;
        self.state = next;
        Ok(())
    }

    pub(crate) fn store_token(&mut self, token: AccessToken) -> IdentityResult<()> {
        if self.access_token.is_some() {
            return Err(IdentityError::InvalidState(
                "an access token was already issued for this login attempt".to_string(),
            ));
        }
        self.transition(LoginState::TokenAcquired)?;
        self.access_token = Some(token);
        Ok(())
    }

    /// Terminal failure. A session that already finished stays as it is.
    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        let failed = LoginState::Failed(reason.into());
        if self.state.allows(&failed) {
            self.state = failed;
        }
    }
}
