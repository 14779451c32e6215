//! Configuration module
//!
//! [`AppConfig`] mirrors the TOML file; environment variables override it.
//! [`AppConfig::validate`] turns it into [`RuntimeSettings`] and refuses to
//! start outside the development profile without a real signing secret.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::infrastructure::crypto::password::{MAX_COST, MIN_COST};

/// Directory URL used in development when none is configured.
pub const DEV_DIRECTORY_URL: &str = "http://db-service:5003";
/// Signing secret used in development when none is configured.
pub const DEV_JWT_SECRET: &str = "dev-only-insecure-secret";
/// Minimum secret length accepted outside development (HS256 key size).
pub const MIN_SECRET_LEN: usize = 32;
/// Longest accepted access-token lifetime (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("JWT signing secret is not configured (set JWT_SECRET_KEY)")]
    MissingSecret,

    #[error("JWT signing secret must be at least {} bytes", MIN_SECRET_LEN)]
    WeakSecret,

    #[error("user directory URL is not configured (set DB_SERVICE_URL)")]
    MissingDirectoryUrl,

    #[error("invalid user directory URL: {0}")]
    InvalidDirectoryUrl(String),

    #[error("the in-memory user directory is only available in the development profile")]
    InMemoryDirectoryOutsideDevelopment,

    #[error("the in-memory user directory cannot be combined with a directory URL ({0})")]
    InMemoryDirectoryWithUrl(String),

    #[error("user directory timeout must be at least 1 second")]
    InvalidDirectoryTimeout,

    #[error("bcrypt cost {0} is outside {}..={}", MIN_COST, MAX_COST)]
    InvalidCost(u32),

    #[error("token TTL must be between 1 and {} minutes, got {0}", MAX_TOKEN_TTL_MINUTES)]
    InvalidTokenTtl(i64),
}

/// Deployment profile. Only `development` may fall back to built-in secrets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Development,
    #[default]
    Production,
}

impl std::str::FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue {
                key: "profile",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: Option<SecretString>,
    pub token_ttl_minutes: i64,
    pub issuer: String,
    pub bcrypt_cost: u32,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: 15,
            issuer: "auth-service".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectorySection {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// Serve users from process memory (development only)
    pub in_memory: bool,
}

impl Default for DirectorySection {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 5,
            in_memory: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Application configuration as read from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: Profile,
    pub server: ServerSection,
    pub security: SecuritySection,
    pub directory: DirectorySection,
    pub logging: LoggingSection,
}

/// Where user records live.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryTarget {
    Http { base_url: String, timeout: Duration },
    InMemory,
}

/// Validated settings the server is started with.
#[derive(Debug)]
pub struct RuntimeSettings {
    pub profile: Profile,
    pub host: String,
    pub port: u16,
    pub shutdown_timeout: u64,
    pub jwt_secret: SecretString,
    pub issuer: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub directory: DirectoryTarget,
}

impl RuntimeSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `<config dir>/auth-service/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("auth-service")
        .join("config.toml")
}

impl AppConfig {
    /// Read `path` (missing file → defaults) and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&raw)?
        } else {
            Self::default()
        };

        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("JWT_SECRET_KEY") {
            self.security.jwt_secret = Some(SecretString::from(secret));
        }
        if let Some(url) = lookup("DB_SERVICE_URL") {
            self.directory.base_url = Some(url);
        }
        if let Some(profile) = lookup("AUTH_PROFILE") {
            self.profile = profile.parse()?;
        }
        if let Some(port) = lookup("AUTH_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "AUTH_PORT",
                value: port,
            })?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(self)
    }

    /// Resolve defaults for the active profile and check every constraint.
    pub fn validate(&self) -> Result<RuntimeSettings, ConfigError> {
        let dev = self.profile == Profile::Development;

        let jwt_secret = match self
            .security
            .jwt_secret
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())
        {
            Some(secret) if !dev && secret.expose_secret().len() < MIN_SECRET_LEN => {
                return Err(ConfigError::WeakSecret)
            }
            Some(secret) => secret.clone(),
            None if dev => {
                warn!("No JWT secret configured; using the development fallback");
                SecretString::from(DEV_JWT_SECRET.to_string())
            }
            None => return Err(ConfigError::MissingSecret),
        };

        let cost = self.security.bcrypt_cost;
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(ConfigError::InvalidCost(cost));
        }

        let ttl_minutes = self.security.token_ttl_minutes;
        let token_ttl = Some(ttl_minutes)
            .filter(|m| (1..=MAX_TOKEN_TTL_MINUTES).contains(m))
            .and_then(chrono::Duration::try_minutes)
            .ok_or(ConfigError::InvalidTokenTtl(ttl_minutes))?;

        let configured_url = self.directory.base_url.as_deref().filter(|u| !u.is_empty());

        let directory = if self.directory.in_memory {
            if !dev {
                return Err(ConfigError::InMemoryDirectoryOutsideDevelopment);
            }
            if let Some(url) = configured_url {
                return Err(ConfigError::InMemoryDirectoryWithUrl(url.to_string()));
            }
            DirectoryTarget::InMemory
        } else {
            if self.directory.timeout_secs == 0 {
                return Err(ConfigError::InvalidDirectoryTimeout);
            }
            let base_url = match configured_url {
                Some(url) => url.to_string(),
                None if dev => DEV_DIRECTORY_URL.to_string(),
                None => return Err(ConfigError::MissingDirectoryUrl),
            };
            Url::parse(&base_url)
                .map_err(|e| ConfigError::InvalidDirectoryUrl(format!("{}: {}", base_url, e)))?;
            DirectoryTarget::Http {
                base_url,
                timeout: Duration::from_secs(self.directory.timeout_secs),
            }
        };

        Ok(RuntimeSettings {
            profile: self.profile,
            host: self.server.host.clone(),
            port: self.server.port,
            shutdown_timeout: self.server.shutdown_timeout,
            jwt_secret,
            issuer: self.security.issuer.clone(),
            token_ttl,
            bcrypt_cost: cost,
            directory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const STRONG: &str = "0123456789abcdef0123456789abcdef";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.profile, Profile::Production);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.security.token_ttl_minutes, 15);
    }

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            profile = "development"

            [server]
            port = 8080

            [directory]
            base_url = "http://users:5003"
            timeout_secs = 2

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.profile, Profile::Development);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.directory.timeout_secs, 2);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .with_overrides(env(&[
                ("JWT_SECRET_KEY", STRONG),
                ("DB_SERVICE_URL", "http://users:9000"),
                ("AUTH_PORT", "7000"),
            ]))
            .unwrap();

        let settings = config.validate().unwrap();
        assert_eq!(settings.jwt_secret.expose_secret(), STRONG);
        assert_eq!(settings.port, 7000);
        assert_eq!(
            settings.directory,
            DirectoryTarget::Http {
                base_url: "http://users:9000".into(),
                timeout: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn test_invalid_port_override() {
        let result = AppConfig::default().with_overrides(env(&[("AUTH_PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_production_requires_secret() {
        let config = AppConfig::default()
            .with_overrides(env(&[("DB_SERVICE_URL", "http://users:9000")]))
            .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn test_production_rejects_weak_secret() {
        let config = AppConfig::default()
            .with_overrides(env(&[
                ("JWT_SECRET_KEY", "super-secret-key"),
                ("DB_SERVICE_URL", "http://users:9000"),
            ]))
            .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::WeakSecret)));
    }

    #[test]
    fn test_production_requires_directory_url() {
        let config = AppConfig::default()
            .with_overrides(env(&[("JWT_SECRET_KEY", STRONG)]))
            .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingDirectoryUrl)
        ));
    }

    #[test]
    fn test_development_fallbacks() {
        let config = AppConfig::default()
            .with_overrides(env(&[("AUTH_PROFILE", "dev")]))
            .unwrap();
        let settings = config.validate().unwrap();

        assert_eq!(settings.jwt_secret.expose_secret(), DEV_JWT_SECRET);
        assert!(matches!(
            settings.directory,
            DirectoryTarget::Http { ref base_url, .. } if base_url == DEV_DIRECTORY_URL
        ));
    }

    #[test]
    fn test_in_memory_directory_is_development_only() {
        let mut config = AppConfig::default();
        config.security.jwt_secret = Some(SecretString::from(STRONG.to_string()));
        config.directory.in_memory = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InMemoryDirectoryOutsideDevelopment)
        ));

        config.profile = Profile::Development;
        assert_eq!(config.validate().unwrap().directory, DirectoryTarget::InMemory);
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut config = AppConfig::default();
        config.profile = Profile::Development;
        config.security.bcrypt_cost = 3;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCost(3))));
    }

    #[test]
    fn test_invalid_directory_url() {
        let mut config = AppConfig::default();
        config.profile = Profile::Development;
        config.directory.base_url = Some("not a url".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDirectoryUrl(_))
        ));
    }

    #[test]
    fn test_in_memory_directory_refuses_configured_url() {
        let mut config = AppConfig::default()
            .with_overrides(env(&[
                ("AUTH_PROFILE", "development"),
                ("DB_SERVICE_URL", "http://users:9000"),
            ]))
            .unwrap();
        config.directory.in_memory = true;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InMemoryDirectoryWithUrl(ref url)) if url == "http://users:9000"
        ));
    }

    #[test]
    fn test_zero_directory_timeout_rejected() {
        let mut config = AppConfig::default();
        config.profile = Profile::Development;
        config.directory.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDirectoryTimeout)
        ));
    }

    #[test]
    fn test_token_ttl_bounds() {
        let mut config = AppConfig::default();
        config.profile = Profile::Development;

        for minutes in [0, -5, MAX_TOKEN_TTL_MINUTES + 1, 200_000_000_000, i64::MAX] {
            config.security.token_ttl_minutes = minutes;
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidTokenTtl(m)) if m == minutes),
                "{} minutes should be rejected",
                minutes
            );
        }

        config.security.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES;
        let settings = config.validate().unwrap();
        assert_eq!(settings.token_ttl.num_minutes(), MAX_TOKEN_TTL_MINUTES);
    }

    #[test]
    fn test_secret_from_toml_is_redacted_in_debug() {
        let config = AppConfig::from_toml_str(&format!(
            "[security]\njwt_secret = \"{}\"\n",
            STRONG
        ))
        .unwrap();

        assert!(!format!("{:?}", config).contains(STRONG));
        let secret = config.security.jwt_secret.as_ref().unwrap();
        assert_eq!(secret.expose_secret(), STRONG);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 5001);
    }
}
