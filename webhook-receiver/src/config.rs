//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables once at startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::web::signature::{SignatureVerifier, DEFAULT_MAX_AGE};

/// Secret used when `WEBHOOK_SECRET_KEY` is not set. Development only.
pub const DEV_SECRET_KEY: &str = "secret_key";

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Deployment mode, from `APP_ENV` (or `GO_ENV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Test,
    Production,
}

impl RunMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => RunMode::Production,
            "test" => RunMode::Test,
            _ => RunMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret for HMAC signature verification
    pub webhook_secret_key: String,

    /// Maximum allowed distance between the webhook timestamp and now
    pub signature_max_age: Duration,

    /// Largest request body accepted, in bytes
    pub max_body_bytes: usize,

    pub run_mode: RunMode,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("webhook_secret_key", &"<redacted>")
            .field("signature_max_age", &self.signature_max_age)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("run_mode", &self.run_mode)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            webhook_secret_key: DEV_SECRET_KEY.to_string(),
            signature_max_age: DEFAULT_MAX_AGE,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            run_mode: RunMode::Development,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let webhook_secret_key = match env::var("WEBHOOK_SECRET_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                warn!("webhook_secret_key_not_configured_using_dev_default");
                defaults.webhook_secret_key
            }
        };

        let run_mode = env::var("APP_ENV")
            .or_else(|_| env::var("GO_ENV"))
            .map(|v| RunMode::parse(&v))
            .unwrap_or(defaults.run_mode);

        Config {
            port: parse_var("PORT", defaults.port),

            webhook_secret_key,

            signature_max_age: Duration::from_secs(parse_var(
                "WEBHOOK_MAX_AGE_SECS",
                defaults.signature_max_age.as_secs(),
            )),

            max_body_bytes: parse_var("WEBHOOK_MAX_BODY_BYTES", defaults.max_body_bytes),

            run_mode,
        }
    }

    /// Build the signature verifier for this configuration.
    pub fn signature_verifier(&self) -> SignatureVerifier {
        SignatureVerifier::new(self.webhook_secret_key.clone(), self.signature_max_age)
    }
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or invalid.
fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_valid() {
        env::set_var("TEST_WEBHOOK_PORT", "9090");
        assert_eq!(parse_var("TEST_WEBHOOK_PORT", 8080u16), 9090);
        env::remove_var("TEST_WEBHOOK_PORT");
    }

    #[test]
    fn test_parse_var_invalid_uses_default() {
        env::set_var("TEST_WEBHOOK_MAX_AGE", "five minutes");
        assert_eq!(parse_var("TEST_WEBHOOK_MAX_AGE", 300u64), 300);
        env::remove_var("TEST_WEBHOOK_MAX_AGE");
    }

    #[test]
    fn test_parse_var_default() {
        assert_eq!(parse_var("NONEXISTENT_WEBHOOK_VAR", 42usize), 42);
    }

    #[test]
    fn test_run_mode_parse() {
        assert_eq!(RunMode::parse("production"), RunMode::Production);
        assert_eq!(RunMode::parse("PROD"), RunMode::Production);
        assert_eq!(RunMode::parse("test"), RunMode::Test);
        assert_eq!(RunMode::parse("staging"), RunMode::Development);
        assert!(!RunMode::parse("").is_production());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.signature_max_age, Duration::from_secs(300));
        assert_eq!(config.signature_verifier().max_age(), Duration::from_secs(300));
        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&format!("\"{}\"", DEV_SECRET_KEY)));
    }
}
