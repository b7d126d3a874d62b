//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which identity source scopes notebook visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityMode {
    /// Every caller is the `guest` user.
    Guest,
    /// Local accounts with register/login/logout.
    Accounts,
}

impl FromStr for IdentityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "guest" => Ok(IdentityMode::Guest),
            "accounts" => Ok(IdentityMode::Accounts),
            other => Err(format!("'{}' is not one of guest, accounts", other)),
        }
    }
}

/// How new record ids are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdStrategy {
    Timestamp,
    Uuid,
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timestamp" => Ok(IdStrategy::Timestamp),
            "uuid" => Ok(IdStrategy::Uuid),
            other => Err(format!("'{}' is not one of timestamp, uuid", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub data_dir: PathBuf,
    pub log_level: Level,
    pub identity_mode: IdentityMode,
    pub id_strategy: IdStrategy,
    pub extraction_url: String,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server and Storage Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let data_dir = PathBuf::from(var_or("DATA_DIR", "./data"));
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingVar("DATA_DIR".to_string()));
        }

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Identity and Record Settings ---
        let identity_mode = var_or("IDENTITY_MODE", "guest")
            .parse::<IdentityMode>()
            .map_err(|e| ConfigError::InvalidValue("IDENTITY_MODE".to_string(), e))?;
        let id_strategy = var_or("ID_STRATEGY", "timestamp")
            .parse::<IdStrategy>()
            .map_err(|e| ConfigError::InvalidValue("ID_STRATEGY".to_string(), e))?;

        // --- Collaborator Settings ---
        let extraction_url = var_or("EXTRACTION_URL", "http://localhost:5000")
            .trim_end_matches('/')
            .to_string();
        // Credentialed CORS needs one explicit origin.
        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:5173").trim().to_string();
        if cors_origin.is_empty() || cors_origin.contains('*') {
            return Err(ConfigError::InvalidValue(
                "CORS_ORIGIN".to_string(),
                format!("'{}' must name a single origin", cors_origin),
            ));
        }

        Ok(Self {
            bind_address,
            data_dir,
            log_level,
            identity_mode,
            id_strategy,
            extraction_url,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.identity_mode, IdentityMode::Guest);
        assert_eq!(config.id_strategy, IdStrategy::Timestamp);
        assert_eq!(config.extraction_url, "http://localhost:5000");
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn values_are_parsed() {
        let config = load(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("IDENTITY_MODE", "Accounts"),
            ("ID_STRATEGY", "uuid"),
            ("EXTRACTION_URL", "http://ocr.local:5000/"),
            ("RUST_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.identity_mode, IdentityMode::Accounts);
        assert_eq!(config.id_strategy, IdStrategy::Uuid);
        assert_eq!(config.extraction_url, "http://ocr.local:5000");
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = load(&[("IDENTITY_MODE", "oauth")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "IDENTITY_MODE"));

        let err = load(&[("BIND_ADDRESS", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "BIND_ADDRESS"));
    }

    #[test]
    fn wildcard_cors_origin_is_rejected() {
        for origin in ["*", " ", "https://*.example.com"] {
            let err = load(&[("CORS_ORIGIN", origin)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "CORS_ORIGIN"));
        }
        let config = load(&[("CORS_ORIGIN", "https://notes.example.com")]).unwrap();
        assert_eq!(config.cors_origin, "https://notes.example.com");
    }
}
