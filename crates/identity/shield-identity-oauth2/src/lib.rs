//! OAuth2 authorization code login with identity normalization.
//!
//! This crate implements the client side of the OAuth2 Authorization Code flow
//! for third-party identity providers. A provider is described by static data
//! (a [`ProviderDescriptor`]) and a [`ProfileDialect`] that knows the shape of
//! its profile responses; everything else (the link, the code exchange, the
//! profile fetch with its email fallback and the normalization) is shared.
//!
//! GitHub and Google are supported out of the box. Each call to
//! [`OAuth2Provider::complete_login`](shield_identity_core::IdentityProvider::complete_login)
//! runs in its own [`LoginAttempt`], so one provider value can serve
//! concurrent requests.

mod client;
mod config;
mod descriptor;
mod dialect;
mod exchange;
mod github;
mod google;
mod link;
mod normalize;
mod profile;
mod provider;
mod session;
mod transport;
mod types;


pub use client::OAuth2Client;
pub use config::{ClientCredentials, OAuth2Config, ProviderSettings};
pub use descriptor::ProviderDescriptor;
pub use dialect::{ProfileDialect, dialect_for};
pub use github::GithubDialect;
pub use google::GoogleDialect;
pub use link::build_authorization_link;
pub use normalize::{
    FieldMapping, FieldValue, GeneratedPassword, IdentityFields, NormalizeMode,
    identity_from_profile, normalize, normalize_named,
};
pub use profile::select_email;
pub use provider::{LoginAttempt, OAuth2Provider, registry_from_config};
pub use session::{AccessToken, LoginState, OAuthSession};
pub use transport::ReqwestTransport;
pub use types::{EmailCandidate, RawProfile};

// Re-export common types for convenience
pub use shield_identity_core::{
    HttpTransport, IdentityError, IdentityProvider, IdentityResult, NormalizedIdentity,
    ProviderRegistry,
};
