use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::bulletin::linking::{DEFAULT_TOP_N, MIN_CONFIDENCE};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("WATCHER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Linking thresholds and the data files the engine starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub min_confidence: f64,
    pub top_n: usize,
    pub catalog_path: Option<PathBuf>,
    pub synonyms_path: Option<PathBuf>,
    pub fiscal_year: Option<i32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE,
            top_n: DEFAULT_TOP_N,
            catalog_path: None,
            synonyms_path: None,
            fiscal_year: None,
        }
    }
}

impl EngineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let min_confidence = match non_empty_var("WATCHER_MIN_CONFIDENCE") {
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|value| (0.0..=1.0).contains(value))
                .ok_or(ConfigError::InvalidMinConfidence(raw))?,
            None => defaults.min_confidence,
        };

        let top_n = match non_empty_var("WATCHER_TOP_N") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|value| *value >= 1)
                .ok_or(ConfigError::InvalidTopN(raw))?,
            None => defaults.top_n,
        };

        let fiscal_year = match non_empty_var("WATCHER_FISCAL_YEAR") {
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| ConfigError::InvalidFiscalYear(raw))?,
            ),
            None => None,
        };

        Ok(Self {
            min_confidence,
            top_n,
            catalog_path: non_empty_var("WATCHER_CATALOG_PATH").map(PathBuf::from),
            synonyms_path: non_empty_var("WATCHER_SYNONYMS_PATH").map(PathBuf::from),
            fiscal_year,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMinConfidence(String),
    InvalidTopN(String),
    InvalidFiscalYear(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMinConfidence(value) => write!(
                f,
                "WATCHER_MIN_CONFIDENCE must be a number between 0 and 1, got '{}'",
                value
            ),
            ConfigError::InvalidTopN(value) => {
                write!(f, "WATCHER_TOP_N must be a positive integer, got '{}'", value)
            }
            ConfigError::InvalidFiscalYear(value) => {
                write!(f, "WATCHER_FISCAL_YEAR must be a year, got '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidMinConfidence(_)
            | ConfigError::InvalidTopN(_)
            | ConfigError::InvalidFiscalYear(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "WATCHER_LOG_LEVEL",
            "WATCHER_MIN_CONFIDENCE",
            "WATCHER_TOP_N",
            "WATCHER_CATALOG_PATH",
            "WATCHER_SYNONYMS_PATH",
            "WATCHER_FISCAL_YEAR",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn engine_settings_are_read_and_validated() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("WATCHER_MIN_CONFIDENCE", "0.55");
        env::set_var("WATCHER_TOP_N", "5");
        env::set_var("WATCHER_CATALOG_PATH", "data/catalog.csv");
        env::set_var("WATCHER_FISCAL_YEAR", "2024");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.engine.min_confidence, 0.55);
        assert_eq!(config.engine.top_n, 5);
        assert_eq!(
            config.engine.catalog_path,
            Some(PathBuf::from("data/catalog.csv"))
        );
        assert_eq!(config.engine.synonyms_path, None);
        assert_eq!(config.engine.fiscal_year, Some(2024));

        env::set_var("WATCHER_MIN_CONFIDENCE", "1.5");
        let error = AppConfig::load().expect_err("out of range");
        assert!(matches!(error, ConfigError::InvalidMinConfidence(_)));

        env::set_var("WATCHER_MIN_CONFIDENCE", "0.4");
        env::set_var("WATCHER_TOP_N", "0");
        let error = AppConfig::load().expect_err("zero top n");
        assert!(error.to_string().contains("WATCHER_TOP_N"));
        reset_env();
    }
}
