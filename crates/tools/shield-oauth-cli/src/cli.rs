use crate::config::{LoggingConfig, Settings};
use crate::error::ToolError;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use shield_identity_oauth2::{
    FieldValue, IdentityFields, NormalizeMode, ProviderRegistry, ReqwestTransport,
    normalize_named, registry_from_config,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Drive the OAuth2 authorization code login from the command line
#[derive(Parser, Debug)]
#[command(name = "shield-oauth")]
#[command(about = "Build OAuth2 authorization links and complete logins")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Path to the configuration file (TOML)
    #[arg(short, long, value_name = "FILE", default_value = "shield-oauth.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the authorization link to redirect the user to
    Link {
        /// Provider id, e.g. github
        #[arg(short, long)]
        provider: String,

        /// State nonce to embed (a fresh UUID when omitted)
        #[arg(short, long)]
        state: Option<String>,
    },

    /// Exchange an authorization code and print the normalized identity
    Complete {
        /// Provider id, e.g. github
        #[arg(short, long)]
        provider: String,

        /// The `code` query parameter from the callback
        #[arg(long, required_unless_present = "error")]
        code: Option<String>,

        /// The `error` query parameter, when the provider redirected with one
        #[arg(long)]
        error: Option<String>,

        /// The `error_description` query parameter
        #[arg(long, requires = "error")]
        error_description: Option<String>,

        /// The `state` query parameter, passed through unchanged
        #[arg(short, long)]
        state: Option<String>,

        /// Column projection: newUser or syncingUserInfo
        #[arg(short, long, default_value = "newUser")]
        mode: String,
    },

    /// List the configured providers
    Providers,
}

impl Args {
    /// Load configuration, set up logging and execute the command
    pub async fn run(&self) -> Result<String, ToolError> {
        let settings = Settings::load_from(&self.config).map_err(ToolError::Configuration)?;
        init_tracing(&settings.logging, self.verbose);

        match &settings.source {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => debug!(
                "No config file found at {}, using defaults and environment",
                self.config.display()
            ),
        }

        self.execute(&settings).await
    }

    /// Execute the command against already loaded settings
    pub async fn execute(&self, settings: &Settings) -> Result<String, ToolError> {
        let registry = build_registry(settings)?;

        match &self.command {
            Command::Link { provider, state } => {
                let provider = registry.get(provider)?;
                let state = state
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                let url = provider.build_authorization_link(&state);

                let output = json!({
                    "provider": provider.provider_id(),
                    "state": state,
                    "url": url,
                });
                Ok(serde_json::to_string_pretty(&output)?)
            }
            Command::Complete {
                provider,
                code,
                error,
                error_description,
                state,
                mode,
            } => {
                if NormalizeMode::from_name(mode).is_none() {
                    return Err(ToolError::UnknownMode(mode.clone()));
                }

                let provider = registry.get(provider)?;
                let params: HashMap<String, String> = [
                    ("code", code),
                    ("error", error),
                    ("error_description", error_description),
                    ("state", state),
                ]
                .into_iter()
                .filter_map(|(name, value)| value.clone().map(|v| (name.to_string(), v)))
                .collect();
                let identity = provider.complete_login(&params).await?;
                info!(
                    provider = %identity.provider_id,
                    login = %identity.login_handle,
                    "Login completed"
                );

                let fields =
                    normalize_named(&identity, mode, &settings.oauth.users_columns_name);

                let output = json!({
                    "identity": identity,
                    "fields": printable_fields(&fields),
                });
                Ok(serde_json::to_string_pretty(&output)?)
            }
            Command::Providers => Ok(registry.provider_ids().join("\n")),
        }
    }
}

fn build_registry(settings: &Settings) -> Result<ProviderRegistry, ToolError> {
    let transport = ReqwestTransport::new(settings.oauth.http_timeout())?;
    Ok(registry_from_config(&settings.oauth, Arc::new(transport))?)
}

/// Render fields as JSON with generated passwords masked.
fn printable_fields(fields: &IdentityFields) -> Value {
    let mut map = Map::new();
    for (column, value) in fields.iter() {
        let value = match value {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Flag(flag) => Value::Bool(*flag),
            FieldValue::Secret(_) => Value::String("********".to_string()),
        };
        map.insert(column.to_string(), value);
    }
    Value::Object(map)
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed when embedded in tests
    let _ = match logging.format.to_lowercase().as_str() {
        "pretty" => builder.pretty().try_init(),
        "full" => builder.try_init(),
        _ => builder.compact().try_init(),
    };
}
