use shield_identity_oauth2::IdentityError;
use thiserror::Error;

/// Errors that can occur while running a CLI command
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Configuration error: {0:#}")]
    Configuration(anyhow::Error),

    #[error("Login failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("Unknown normalization mode '{0}' (expected newUser or syncingUserInfo)")]
    UnknownMode(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}
