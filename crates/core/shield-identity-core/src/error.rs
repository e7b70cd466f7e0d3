use thiserror::Error;

/// Failure of a single HTTP call at the transport layer.
///
/// A response with an error status is not a transport error; this only covers
/// the cases where no response was received at all.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Missing or malformed client configuration. Raised before any request.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("HTTP transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The provider answered but did not hand out a usable token. Codes are
    /// single-use, so the user has to restart the login.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("No email addresses found for the user")]
    NoEmailFound,

    #[error("Invalid profile response: {0}")]
    ProfileParse(String),

    /// The provider redirected back with an error, or without a code.
    #[error("Callback error: {0}")]
    Callback(String),

    #[error("Invalid login state: {0}")]
    InvalidState(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;
