//! Mapping provider profiles onto the host's user columns.

use crate::types::RawProfile;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use shield_identity_core::{IdentityError, IdentityResult, NormalizedIdentity};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

const PASSWORD_LENGTH: usize = 32;

/// Host column names for the display attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            first_name: "first_name".to_string(),
            last_name: "last_name".to_string(),
            avatar: "avatar".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Full record for provisioning a local account
    NewUser,
    /// Display attributes of an account that already exists
    SyncExisting,
}

impl NormalizeMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "newUser" | "new_user" => Some(NormalizeMode::NewUser),
            "syncingUserInfo" | "syncing_user_info" | "sync_existing" => {
                Some(NormalizeMode::SyncExisting)
            }
            _ => None,
        }
    }
}

/// Random local password for accounts created through OAuth.
///
/// Nobody knows it; it only keeps the password column filled. Plaintext is
/// reachable through [`expose`](Self::expose) and serialization, never `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedPassword(String);

impl GeneratedPassword {
    pub fn generate() -> Self {
        let value: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(PASSWORD_LENGTH)
            .map(char::from)
            .collect();
        Self(value)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GeneratedPassword([redacted])")
    }
}

impl Serialize for GeneratedPassword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Secret(GeneratedPassword),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }
}

/// Column name → value, ready for the host's user storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentityFields(BTreeMap<String, FieldValue>);

impl IdentityFields {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(column, value)| (column.as_str(), value))
    }

    fn insert(&mut self, column: &str, value: FieldValue) {
        self.0.insert(column.to_string(), value);
    }
}

/// Validate a fetched profile into a [`NormalizedIdentity`].
///
/// Login handle and email must be present and non-empty; missing name and
/// avatar become empty strings.
pub fn identity_from_profile(
    provider_id: &str,
    profile: RawProfile,
) -> IdentityResult<NormalizedIdentity> {
    let login_handle = profile
        .login
        .filter(|login| !login.is_empty())
        .ok_or_else(|| IdentityError::ProfileParse("profile has no login handle".to_string()))?;
    let email = profile
        .email
        .filter(|email| !email.is_empty())
        .ok_or(IdentityError::NoEmailFound)?;

    Ok(NormalizedIdentity {
        provider_id: provider_id.to_string(),
        login_handle,
        email,
        display_name: profile.name.unwrap_or_default(),
        avatar_url: profile.avatar_url.unwrap_or_default(),
    })
}

/// Column values for the given workflow.
///
/// The provider exposes a single name, so it fills both name columns.
pub fn normalize(
    identity: &NormalizedIdentity,
    mode: NormalizeMode,
    mapping: &FieldMapping,
) -> IdentityFields {
    let mut fields = IdentityFields::default();

    if mode == NormalizeMode::NewUser {
        fields.insert("username", FieldValue::Text(identity.login_handle.clone()));
        fields.insert("email", FieldValue::Text(identity.email.clone()));
        fields.insert("password", FieldValue::Secret(GeneratedPassword::generate()));
        fields.insert("active", FieldValue::Flag(true));
    }

    fields.insert(
        &mapping.first_name,
        FieldValue::Text(identity.display_name.clone()),
    );
    fields.insert(
        &mapping.last_name,
        FieldValue::Text(identity.display_name.clone()),
    );
    fields.insert(&mapping.avatar, FieldValue::Text(identity.avatar_url.clone()));

    fields
}

/// [`normalize`] with the mode given by name. Unknown names yield no fields.
pub fn normalize_named(
    identity: &NormalizedIdentity,
    mode_name: &str,
    mapping: &FieldMapping,
) -> IdentityFields {
    match NormalizeMode::from_name(mode_name) {
        Some(mode) => normalize(identity, mode, mapping),
        None => {
            debug!(mode = mode_name, "Unknown normalization mode, returning no fields");
            IdentityFields::default()
        }
    }
}
