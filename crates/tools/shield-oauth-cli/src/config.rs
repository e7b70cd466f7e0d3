//! Configuration loading for the CLI
//!
//! Sources, lowest precedence first:
//! - Built-in defaults
//! - Configuration file (`shield-oauth.toml` unless `--config` says otherwise)
//! - Environment variables with the `SHIELD_OAUTH` prefix
//! - `<PROVIDER>_CLIENT_ID`, `<PROVIDER>_CLIENT_SECRET` and `RUST_LOG`

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use shield_identity_oauth2::{OAuth2Config, dialect_for};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Everything the CLI reads at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OAuth2 client configuration shared by every provider
    pub oauth: OAuth2Config,
    pub logging: LoggingConfig,
    /// Where the settings were read from, if a file was found
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `shield_identity_oauth2=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact, full)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load configuration from an optional file and the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        let source = if path.exists() {
            builder = builder.add_source(File::from(path));
            Some(path.to_path_buf())
        } else {
            None
        };

        // SHIELD_OAUTH__OAUTH__BASE_URL, SHIELD_OAUTH__LOGGING__LEVEL, ...
        builder = builder.add_source(
            Environment::with_prefix("SHIELD_OAUTH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut settings: Settings = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        settings.source = source;

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Apply the conventional per-provider credential variables
    fn apply_env_overrides(&mut self) {
        for (provider_id, provider) in self.oauth.providers.iter_mut() {
            let prefix = provider_id.to_uppercase();

            if let Ok(client_id) = std::env::var(format!("{}_CLIENT_ID", prefix)) {
                provider.client_id = client_id;
            }
            if let Ok(client_secret) = std::env::var(format!("{}_CLIENT_SECRET", prefix)) {
                provider.client_secret = client_secret;
            }
        }

        if let Ok(log_level) = std::env::var("RUST_LOG") {
            self.logging.level = log_level;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.oauth
            .callback_url()
            .context("Invalid callback configuration")?;

        if self.oauth.http_timeout_seconds == 0 {
            anyhow::bail!("HTTP timeout must be greater than 0");
        }

        if self.oauth.providers.is_empty() {
            anyhow::bail!("At least one provider must be configured under [oauth.providers]");
        }

        for provider_id in self.oauth.providers.keys() {
            dialect_for(provider_id)
                .with_context(|| format!("Invalid provider '{}'", provider_id))?;
            self.oauth
                .credentials(provider_id)
                .with_context(|| format!("Invalid credentials for provider '{}'", provider_id))?;
        }

        EnvFilter::try_new(&self.logging.level)
            .with_context(|| format!("Invalid log level '{}'", self.logging.level))?;

        let valid_formats = ["pretty", "compact", "full"];
        let format_lower = self.logging.format.to_lowercase();
        if !valid_formats.contains(&format_lower.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        Ok(())
    }
}
