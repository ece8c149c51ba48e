//! Environment-backed server configuration.
//!
//! Most settings have defaults. Override with `ATTRITION_*` environment variables.
//! Scoring knobs (policy, thresholds, factor rules) live in
//! [`PipelineConfig`](crate::pipeline::PipelineConfig).

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ATTRITION_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `5000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding the classifier, encoder and metadata artifacts. Default: `./artifacts`.
    pub artifact_dir: PathBuf,

    /// Exit at startup instead of serving in the "model not loaded" state. Default: `false`.
    pub require_model: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            artifact_dir: PathBuf::from("./artifacts"),
            require_model: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "ATTRITION_PORT";
    const ENV_BIND_ADDR: &'static str = "ATTRITION_BIND_ADDR";
    const ENV_ARTIFACT_DIR: &'static str = "ATTRITION_ARTIFACT_DIR";
    const ENV_REQUIRE_MODEL: &'static str = "ATTRITION_REQUIRE_MODEL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let artifact_dir = Self::parse_path_from_env(Self::ENV_ARTIFACT_DIR, defaults.artifact_dir);
        let require_model = parse_bool_from_env(Self::ENV_REQUIRE_MODEL, defaults.require_model)?;

        Ok(Self {
            port,
            bind_addr,
            artifact_dir,
            require_model,
        })
    }

    /// Validates paths and basic invariants. A missing artifact directory is not an error
    /// here; it surfaces later as the "model not loaded" state.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.artifact_dir.exists() && !self.artifact_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.artifact_dir.clone(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }
}

/// Reads an environment variable, returning `None` when unset or blank.
pub(crate) fn read_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match read_env(name) {
        Some(value) => match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name,
                value,
                reason: "expected true or false".to_string(),
            }),
        },
        None => Ok(default),
    }
}

pub(crate) fn parse_f64_from_env(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match read_env(name) {
        Some(value) => match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(parsed),
            Ok(_) => Err(ConfigError::InvalidValue {
                name,
                value,
                reason: "must be a finite number".to_string(),
            }),
            Err(e) => Err(ConfigError::InvalidValue {
                name,
                value,
                reason: e.to_string(),
            }),
        },
        None => Ok(default),
    }
}

pub(crate) fn parse_usize_from_env(
    name: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    match read_env(name) {
        Some(value) => value.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidValue {
                name,
                value,
                reason: e.to_string(),
            }
        }),
        None => Ok(default),
    }
}

pub(crate) fn parse_list_from_env(name: &str) -> Option<Vec<String>> {
    read_env(name).map(|value| {
        value
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
}
