//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::extract::{Extractor, PriceBand};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the API server listens on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// SQLite database URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Output format for CLI reports
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub scraper: ScraperConfig,

    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_bind() -> String {
    "127.0.0.1:4000".to_string()
}

fn default_database_url() -> String {
    "sqlite://price-compare.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            database_url: default_database_url(),
            format: OutputFormat::Table,
            admin: AdminConfig::default(),
            scraper: ScraperConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

/// The single admin identity and token signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,

    /// Argon2 PHC string of the admin password
    #[serde(default)]
    pub password_hash: Option<String>,

    /// HMAC secret for signing admin tokens
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

/// Longest admin token lifetime accepted from config, in days.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

fn default_token_ttl_days() -> i64 {
    30
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password_hash: None,
            jwt_secret: None,
            token_ttl_days: default_token_ttl_days(),
        }
    }
}

/// Settings for fetching store product pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Store base URL; product pages live at `<store_url>/dp/<ASIN>`
    #[serde(default = "default_store_url")]
    pub store_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Upper bound on waiting for a page, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay before each page request in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,
}

fn default_store_url() -> String {
    "https://www.amazon.in".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-IN,en;q=0.9".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_delay_ms() -> u64 {
    0
}

fn default_delay_jitter_ms() -> u64 {
    0
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            store_url: default_store_url(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
        }
    }
}

/// Plausibility bands and number format for price extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Band used when no category-specific band applies
    #[serde(default)]
    pub band: PriceBand,

    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,

    /// Per-category bands, keyed by category label
    #[serde(default)]
    pub categories: HashMap<String, PriceBand>,
}

fn default_thousands_separator() -> char {
    ','
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            band: PriceBand::default(),
            thousands_separator: default_thousands_separator(),
            categories: HashMap::new(),
        }
    }
}

impl ExtractorConfig {
    /// Returns the band for a category, falling back to the default band.
    pub fn band_for(&self, category: Option<&str>) -> PriceBand {
        category.and_then(|c| self.categories.get(c)).copied().unwrap_or(self.band)
    }

    /// Builds an extractor for a category.
    pub fn extractor_for(&self, category: Option<&str>) -> Extractor {
        Extractor::new(self.band_for(category)).with_separator(self.thousands_separator)
    }

    fn validate(&self) -> Result<()> {
        self.band.validate().map_err(anyhow::Error::msg)?;
        for (category, band) in &self.categories {
            band.validate()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Bad band for category '{}'", category))?;
        }
        Ok(())
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .extractor
            .validate()
            .with_context(|| format!("Invalid extractor settings in {}", path.display()))?;

        Ok(config)
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("price-compare").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(bind) = std::env::var("PRICECOMPARE_BIND") {
            self.bind = bind;
        }

        if let Ok(url) = std::env::var("PRICECOMPARE_DATABASE_URL") {
            self.database_url = url;
        }

        if let Ok(user) = std::env::var("PRICECOMPARE_ADMIN_USER") {
            self.admin.username = user;
        }

        if let Ok(hash) = std::env::var("PRICECOMPARE_ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = Some(hash);
        }

        if let Ok(secret) = std::env::var("PRICECOMPARE_JWT_SECRET") {
            self.admin.jwt_secret = Some(secret);
        }

        if let Ok(proxy) = std::env::var("PRICECOMPARE_PROXY") {
            self.scraper.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("PRICECOMPARE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.scraper.timeout_secs = t;
            }
        }

        self
    }

    /// Returns the admin credentials, failing if any secret is missing.
    pub fn admin_credentials(&self) -> Result<AdminCredentials> {
        let password_hash = self
            .admin
            .password_hash
            .clone()
            .filter(|h| !h.is_empty())
            .context(
                "Admin password hash is not configured \
                 (admin.password_hash or PRICECOMPARE_ADMIN_PASSWORD_HASH)",
            )?;

        let jwt_secret = self
            .admin
            .jwt_secret
            .clone()
            .filter(|s| !s.is_empty())
            .context(
                "Token signing secret is not configured \
                 (admin.jwt_secret or PRICECOMPARE_JWT_SECRET)",
            )?;

        let ttl = self.admin.token_ttl_days;
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&ttl) {
            anyhow::bail!(
                "admin.token_ttl_days must be between 1 and {} (got {})",
                MAX_TOKEN_TTL_DAYS,
                ttl
            );
        }

        Ok(AdminCredentials {
            username: self.admin.username.clone(),
            password_hash,
            jwt_secret,
            token_ttl_days: self.admin.token_ttl_days,
        })
    }
}

/// Fully resolved admin settings required to serve the API.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password_hash: String,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

/// Output format for CLI reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
