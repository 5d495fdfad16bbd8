//! Application settings loaded from environment variables.

use std::env;

use thiserror::Error;

use super::constants::{
    DEFAULT_BCRYPT_COST, DEFAULT_DATABASE_URL, DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT,
    DEFAULT_LOG_LEVEL, DEFAULT_SITE_DOMAIN, DEFAULT_TOKEN_EXPIRATION_MINUTES, DEV_SECRET_KEY,
    MAX_BCRYPT_COST, MAX_TOKEN_EXPIRATION_MINUTES, MIN_BCRYPT_COST,
};

/// Errors raised while reading configuration at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid bool value for {key}: {value:?}")]
    InvalidBool { key: &'static str, value: String },

    #[error("invalid integer value for {key}: {value:?}")]
    InvalidInt { key: &'static str, value: String },

    #[error("BCRYPT_COST must be between 4 and 31, got {0}")]
    BcryptCostOutOfRange(u32),

    #[error("TOKEN_EXPIRATION_TIME_MINUTES must be between 1 and 525600, got {0}")]
    TokenExpirationOutOfRange(i64),

    #[error("SECRET_KEY must be set outside local development")]
    MissingSecretKey,
}

/// Monolith configuration, read once at startup and immutable afterwards.
#[derive(Clone)]
pub struct Config {
    pub local_dev: bool,
    pub test_runner: bool,
    /// Whether session cookies carry the `Secure` flag
    pub use_ssl: bool,
    pub site_domain: String,
    secret_key: Vec<u8>,
    pub token_expiration_minutes: i64,
    pub bcrypt_cost: u32,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub http_host: String,
    pub http_port: u16,
    pub database_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("local_dev", &self.local_dev)
            .field("test_runner", &self.test_runner)
            .field("use_ssl", &self.use_ssl)
            .field("site_domain", &self.site_domain)
            .field("secret_key", &"[REDACTED]")
            .field("token_expiration_minutes", &self.token_expiration_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("log_level", &self.log_level)
            .field("cors_origins", &self.cors_origins)
            .field("http_host", &self.http_host)
            .field("http_port", &self.http_port)
            .field("database_url", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset, so every key falls back to its default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let local_dev = parse_bool(&get, "LOCAL_DEV", true)?;
        let test_runner = parse_bool(&get, "TEST_RUNNER", false)?;
        let allow_http = parse_bool(&get, "ALLOW_HTTP", false)?;

        let secret_key = match get("SECRET_KEY") {
            Some(secret) => secret.into_bytes(),
            None if local_dev || test_runner => DEV_SECRET_KEY.as_bytes().to_vec(),
            None => return Err(ConfigError::MissingSecretKey),
        };

        let default_cost = if test_runner {
            MIN_BCRYPT_COST
        } else {
            DEFAULT_BCRYPT_COST
        };
        let bcrypt_cost = parse_int(&get, "BCRYPT_COST", default_cost)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::BcryptCostOutOfRange(bcrypt_cost));
        }

        let token_expiration_minutes = parse_int(
            &get,
            "TOKEN_EXPIRATION_TIME_MINUTES",
            DEFAULT_TOKEN_EXPIRATION_MINUTES,
        )?;
        if !(1..=MAX_TOKEN_EXPIRATION_MINUTES).contains(&token_expiration_minutes) {
            return Err(ConfigError::TokenExpirationOutOfRange(
                token_expiration_minutes,
            ));
        }

        Ok(Self {
            local_dev,
            test_runner,
            use_ssl: !allow_http && !local_dev,
            site_domain: get("SITE_DOMAIN").unwrap_or_else(|| DEFAULT_SITE_DOMAIN.to_string()),
            secret_key,
            token_expiration_minutes,
            bcrypt_cost,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            cors_origins: get("CORS_ORIGINS")
                .map(|v| v.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or_default(),
            http_host: get("HTTP_HOST").unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string()),
            http_port: parse_int(&get, "HTTP_PORT", DEFAULT_HTTP_PORT)?,
            database_url: get("USER_POSTGRES_URL")
                .or_else(|| get("DATABASE_URL"))
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        })
    }

    /// Get the secret key bytes for token signing/verification.
    pub fn secret_key_bytes(&self) -> &[u8] {
        &self.secret_key
    }

    /// Whether the insecure development signing key is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY.as_bytes()
    }
}

fn parse_bool<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).as_deref() {
        None => Ok(default),
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(ConfigError::InvalidBool {
            key,
            value: other.to_string(),
        }),
    }
}

fn parse_int<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidInt { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert!(config.local_dev);
        assert!(!config.test_runner);
        assert!(!config.use_ssl);
        assert_eq!(config.site_domain, "localhost");
        assert_eq!(config.token_expiration_minutes, 60);
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
        assert_eq!(config.http_port, 8080);
        assert!(config.cors_origins.is_empty());
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_ssl_only_outside_local_dev() {
        let config = config_from(&[("LOCAL_DEV", "false"), ("SECRET_KEY", "k")]).unwrap();
        assert!(config.use_ssl);

        let config = config_from(&[
            ("LOCAL_DEV", "false"),
            ("ALLOW_HTTP", "true"),
            ("SECRET_KEY", "k"),
        ])
        .unwrap();
        assert!(!config.use_ssl);
    }

    #[test]
    fn test_secret_required_outside_local_dev() {
        let result = config_from(&[("LOCAL_DEV", "false")]);
        assert_eq!(result.unwrap_err(), ConfigError::MissingSecretKey);
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let result = config_from(&[("LOCAL_DEV", "yes")]);
        assert!(matches!(result, Err(ConfigError::InvalidBool { key: "LOCAL_DEV", .. })));
    }

    #[test]
    fn test_invalid_int_is_rejected() {
        let result = config_from(&[("HTTP_PORT", "eighty")]);
        assert!(matches!(result, Err(ConfigError::InvalidInt { key: "HTTP_PORT", .. })));
    }

    #[test]
    fn test_test_runner_uses_cheapest_cost() {
        let config = config_from(&[("TEST_RUNNER", "true")]).unwrap();
        assert_eq!(config.bcrypt_cost, MIN_BCRYPT_COST);
    }

    #[test]
    fn test_bcrypt_cost_range() {
        let result = config_from(&[("BCRYPT_COST", "3")]);
        assert_eq!(result.unwrap_err(), ConfigError::BcryptCostOutOfRange(3));
    }

    #[test]
    fn test_token_expiration_range() {
        for value in ["0", "-5", "525601", "1000000000000"] {
            let result = config_from(&[("TOKEN_EXPIRATION_TIME_MINUTES", value)]);
            assert!(
                matches!(result, Err(ConfigError::TokenExpirationOutOfRange(_))),
                "{} should be rejected",
                value
            );
        }

        let config = config_from(&[("TOKEN_EXPIRATION_TIME_MINUTES", "525600")]).unwrap();
        assert_eq!(config.token_expiration_minutes, 525_600);
    }

    #[test]
    fn test_cors_origins_are_split() {
        let config =
            config_from(&[("CORS_ORIGINS", "http://localhost, https://lines.dev")]).unwrap();
        assert_eq!(config.cors_origins, vec!["http://localhost", "https://lines.dev"]);
    }

    #[test]
    fn test_database_url_prefers_app_specific_key() {
        let config = config_from(&[
            ("USER_POSTGRES_URL", "postgres://user-app"),
            ("DATABASE_URL", "postgres://shared"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "postgres://user-app");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_from(&[("SECRET_KEY", "super-secret")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
