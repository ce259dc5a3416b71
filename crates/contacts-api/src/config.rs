//! Configuration for the contacts API.

use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Token and password hashing configuration
    pub auth: AuthConfig,

    /// Twilio configuration
    pub twilio: TwilioConfig,

    /// Contact handling configuration
    #[serde(default)]
    pub contacts: ContactsConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma separated CORS origins; empty allows any origin
    #[serde(default)]
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the JSON snapshot
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Enable persistence (if false, data is in-memory only)
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC key for signing bearer tokens
    pub jwt_secret: SecretString,

    /// Token lifetime
    #[serde(default = "default_token_ttl", with = "humantime_serde")]
    pub token_ttl: Duration,

    /// Argon2 memory cost in KiB
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,

    /// Argon2 passes
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,

    pub auth_token: SecretString,

    /// Sender number in E.164 format
    pub from_number: String,

    /// REST API base URL
    #[serde(default = "default_twilio_api_url")]
    pub api_url: String,

    /// Request timeout
    #[serde(default = "default_twilio_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactsConfig {
    /// Prefix for phone numbers given without one
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// Largest accepted `limit` on list endpoints
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            allowed_origins: String::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            persist: true,
        }
    }
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/contacts.json")
}

fn default_true() -> bool {
    true
}

fn default_token_ttl() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_hash_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_hash_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

fn default_twilio_api_url() -> String {
    twilio_client::DEFAULT_API_URL.into()
}

fn default_twilio_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_country_code() -> String {
    contacts_store::phone::DEFAULT_COUNTRY_CODE.into()
}

fn default_max_page_size() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".into()
}

impl ServerConfig {
    /// Parsed CORS origins.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            bail!("AUTH__JWT_SECRET must not be empty");
        }
        if self.auth.token_ttl.is_zero() {
            bail!("AUTH__TOKEN_TTL must be greater than zero");
        }
        if !self.contacts.default_country_code.starts_with('+')
            || self.contacts.default_country_code.len() < 2
        {
            bail!(
                "CONTACTS__DEFAULT_COUNTRY_CODE must look like +<digits>, got {:?}",
                self.contacts.default_country_code
            );
        }
        if self.contacts.max_page_size == 0 {
            bail!("CONTACTS__MAX_PAGE_SIZE must be at least 1");
        }
        Ok(())
    }
}
