//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Object storage configuration (Cloudflare R2 or any S3-compatible store).
///
/// Every field except `region` is required: a missing credential is a
/// deployment mistake and must fail at startup, never at request time.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Cloudflare R2 account ID (determines the S3 endpoint).
    pub account_id: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Bucket name.
    pub bucket: String,
    /// Custom domain mapped to the bucket for public reads,
    /// e.g. `assets.example.com`.
    pub public_domain: String,
    /// S3 region. R2 uses the literal region `auto`.
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "auto".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, in order of precedence (later wins):
    /// `config/default.toml`, `config/{RUN_MODE}.toml`, then environment
    /// variables prefixed with `VITRINE` (e.g. `VITRINE__STORAGE__BUCKET`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or a required
    /// storage credential is absent.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("VITRINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
