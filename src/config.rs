//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use axum::http::HeaderValue;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 3000); 0 lets the OS choose
    pub port: u16,
    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,
    /// Origins allowed for CORS. Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Address to bind the listener to
    ///
    /// # Returns
    /// "host:port" like "127.0.0.1:3000"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Deployment environment
///
/// Only `Development` changes behavior: internal error details are
/// included in 500 responses.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
    Test,
}

impl Environment {
    pub fn exposes_error_details(self) -> bool {
        self == Environment::Development
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (AUTHGATE__SECTION__KEY)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment as EnvSource, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.environment", "production")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (AUTHGATE__*)
            .add_source(
                EnvSource::with_prefix("AUTHGATE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Configuration for in-process tests: OS-assigned port, test environment
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: Environment::Test,
                cors_allowed_origins: Vec::new(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.server.host.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "server.host must not be empty".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::error::AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        if let Some(origin) = self
            .server
            .cors_allowed_origins
            .iter()
            .find(|origin| HeaderValue::from_str(origin).is_err())
        {
            return Err(crate::error::AppError::Config(format!(
                "server.cors_allowed_origins contains an invalid origin: {origin:?}"
            )));
        }

        Ok(())
    }

    /// Settings worth flagging once logging is up
    pub fn startup_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.server.environment.exposes_error_details() {
            warnings.push("Development environment: internal error details are exposed");
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_test_config() {
        let config = AppConfig::for_tests();
        assert!(config.validate().is_ok());
        assert!(!config.server.environment.exposes_error_details());
    }

    #[test]
    fn validate_rejects_empty_host() {
        let mut config = AppConfig::for_tests();
        config.server.host = "  ".to_string();

        let error = config.validate().expect_err("empty host must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("server.host")
        ));
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = AppConfig::for_tests();
        config.logging.format = "xml".to_string();

        let error = config.validate().expect_err("unknown format must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("logging.format")
        ));
    }

    #[test]
    fn validate_rejects_invalid_cors_origin() {
        let mut config = AppConfig::for_tests();
        config.server.cors_allowed_origins = vec![
            "https://ok.example.com".to_string(),
            "bad\norigin".to_string(),
        ];

        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_deserializes_lowercase() {
        let env: Environment = serde_json::from_str("\"development\"").unwrap();
        assert_eq!(env, Environment::Development);
        assert!(env.exposes_error_details());
        assert_eq!(Environment::default(), Environment::Production);
    }

    #[test]
    fn development_environment_is_flagged_at_startup() {
        let mut config = AppConfig::for_tests();
        assert!(config.startup_warnings().is_empty());

        config.server.environment = Environment::Development;
        let warnings = config.startup_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("internal error details"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let config = AppConfig::for_tests();
        assert_eq!(config.server.bind_address(), "127.0.0.1:0");
    }
}
