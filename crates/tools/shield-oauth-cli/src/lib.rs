//! Command-line host for the OAuth2 login pipeline.
//!
//! Loads the provider configuration once, then either prints an authorization
//! link or completes a login from the code the provider redirected back with.

pub mod cli;
pub mod config;
pub mod error;
