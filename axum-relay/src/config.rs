//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: RELAY_, section and key separated by a
//!    double underscore: `RELAY_SERVICE__PORT`, `RELAY_SERVICE__TIMEOUT_SECS`)
//! 2. Current working directory: ./config.toml
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pagination::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::response::ResponseMode;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Dispatch configuration
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// CORS mode ("permissive", "restrictive", "disabled")
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: default_cors_mode(),
        }
    }
}

/// Dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Response strategy ("standard" or "simple")
    #[serde(default)]
    pub response_mode: ResponseMode,

    /// Page size applied when the query string omits `limit`
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u64,

    /// Ceiling silently applied to the `limit` query parameter
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            response_mode: ResponseMode::default(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
        }
    }
}

// Default value functions
fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_body_limit_mb() -> usize {
    10 // 10 MB
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_page_limit() -> u64 {
    DEFAULT_PAGE_LIMIT
}

fn default_max_page_limit() -> u64 {
    MAX_PAGE_LIMIT
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Reads `./config.toml` when present. Environment variables (RELAY_
    /// prefix, double underscore between section and key, so
    /// `RELAY_RELAY__MAX_PAGE_LIMIT` reaches `relay.max_page_limit`)
    /// override file-based configuration.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file
    ///
    /// Useful for testing or non-standard deployments.
    pub fn load_from(path: &str) -> Result<Self> {
        let config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Load from config file (if exists)
            .merge(Toml::file(path))
            // Override with environment variables. The section separator is
            // a double underscore; a single one would cut keys like
            // timeout_secs into bogus nested paths.
            .merge(Env::prefixed("RELAY_").split("__"))
            .extract()?;

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "axum-relay".to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
            },
            middleware: MiddlewareConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.middleware.body_limit_mb, 10);
        assert_eq!(config.relay.response_mode, ResponseMode::Standard);
        assert_eq!(config.relay.default_page_limit, 10);
        assert_eq!(config.relay.max_page_limit, 1000);
    }

    #[test]
    fn test_load_from_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[service]
name = "widget-api"
port = 9000

[relay]
response_mode = "simple"
default_page_limit = 25
"#,
            )?;

            let config = Config::load().unwrap();
            assert_eq!(config.service.name, "widget-api");
            assert_eq!(config.service.port, 9000);
            assert_eq!(config.relay.response_mode, ResponseMode::Simple);
            assert_eq!(config.relay.default_page_limit, 25);
            // Untouched sections keep their defaults
            assert_eq!(config.relay.max_page_limit, 1000);
            assert_eq!(config.middleware.cors_mode, "permissive");
            Ok(())
        });
    }

    #[test]
    fn test_load_from_missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load_from("/nonexistent/config.toml").unwrap();
            assert_eq!(config.service.name, "axum-relay");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_underscored_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RELAY_SERVICE__TIMEOUT_SECS", "99");
            jail.set_env("RELAY_MIDDLEWARE__BODY_LIMIT_MB", "2");
            jail.set_env("RELAY_RELAY__MAX_PAGE_LIMIT", "200");

            let config = Config::load().unwrap();
            assert_eq!(config.service.timeout_secs, 99);
            assert_eq!(config.middleware.body_limit_mb, 2);
            assert_eq!(config.relay.max_page_limit, 200);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[service]
name = "widget-api"
port = 9000
"#,
            )?;
            jail.set_env("RELAY_SERVICE__PORT", "9111");

            let config = Config::load().unwrap();
            assert_eq!(config.service.port, 9111);
            // Keys the environment leaves alone still come from the file
            assert_eq!(config.service.name, "widget-api");
            Ok(())
        });
    }
}
