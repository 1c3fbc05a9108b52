//! Client Configuration
//!
//! Parses and validates the client configuration file at
//! `~/.config/kaspad-client/client.toml`:
//!
//! ```toml
//! [endpoint]
//! host = "127.0.0.1"
//! port = 16110
//! tls = false
//! connect_timeout_seconds = 10
//! ```
//!
//! Host and port have no built-in defaults. They must come from the file or
//! from explicit overrides (CLI flags), which win over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    pub endpoint: EndpointConfig,
}

/// Node endpoint to connect to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointConfig {
    /// Hostname or IP address of the node
    pub host: String,
    /// RPC port
    pub port: u16,
    /// Wrap the connection in TLS
    pub tls: bool,
    /// Bound on connection establishment (calls themselves are never timed out)
    pub connect_timeout_seconds: Option<u64>,
}

/// Values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct EndpointOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<bool>,
    pub connect_timeout_seconds: Option<u64>,
}

/// On-disk shape: every field optional until merged with overrides
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    endpoint: RawEndpoint,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawEndpoint {
    host: Option<String>,
    port: Option<u16>,
    tls: Option<bool>,
    connect_timeout_seconds: Option<u64>,
}

/// Errors that can occur when loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Missing required field 'endpoint.{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for 'endpoint.{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "HOME environment variable not set",
            ))
        })?;
        Ok(PathBuf::from(home).join(".config/kaspad-client/client.toml"))
    }

    /// Load configuration from a specific path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::resolve(Some(path), &EndpointOverrides::default())
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Self::from_raw(raw, &EndpointOverrides::default())
    }

    /// Merge the config file with overrides.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// if present; otherwise the overrides alone must supply host and port.
    pub fn resolve(
        path: Option<&Path>,
        overrides: &EndpointOverrides,
    ) -> Result<Self, ConfigError> {
        let raw = match path {
            Some(path) => Self::read_raw(path)?,
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::read_raw(&path)?,
                _ => RawConfig::default(),
            },
        };
        Self::from_raw(raw, overrides)
    }

    fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn from_raw(raw: RawConfig, overrides: &EndpointOverrides) -> Result<Self, ConfigError> {
        let file = raw.endpoint;
        let endpoint = EndpointConfig {
            host: overrides
                .host
                .clone()
                .or(file.host)
                .ok_or(ConfigError::MissingField("host"))?,
            port: overrides
                .port
                .or(file.port)
                .ok_or(ConfigError::MissingField("port"))?,
            tls: overrides.tls.or(file.tls).unwrap_or(false),
            connect_timeout_seconds: overrides
                .connect_timeout_seconds
                .or(file.connect_timeout_seconds),
        };
        endpoint.validate()?;
        Ok(Self { endpoint })
    }
}

impl EndpointConfig {
    /// Validate the endpoint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host",
                reason: "host cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                reason: "port cannot be 0".to_string(),
            });
        }

        if self.connect_timeout_seconds == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout_seconds",
                reason: "timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_endpoint() {
        let config = ClientConfig::parse(
            r#"
            [endpoint]
            host = "node.example"
            port = 16210
            tls = true
            connect_timeout_seconds = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoint.host, "node.example");
        assert_eq!(config.endpoint.port, 16210);
        assert!(config.endpoint.tls);
        assert_eq!(config.endpoint.connect_timeout_seconds, Some(5));
    }

    #[test]
    fn test_tls_defaults_to_off() {
        let config =
            ClientConfig::parse("[endpoint]\nhost = \"127.0.0.1\"\nport = 16110\n").unwrap();
        assert!(!config.endpoint.tls);
        assert_eq!(config.endpoint.connect_timeout_seconds, None);
    }

    #[test]
    fn test_no_builtin_endpoint() {
        let result = ClientConfig::parse("");
        assert!(matches!(result, Err(ConfigError::MissingField("host"))));

        let result = ClientConfig::parse("[endpoint]\nhost = \"127.0.0.1\"\n");
        assert!(matches!(result, Err(ConfigError::MissingField("port"))));
    }

    #[test]
    fn test_port_zero_rejected() {
        let result = ClientConfig::parse("[endpoint]\nhost = \"127.0.0.1\"\nport = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { field: "port", .. })));
    }

    #[test]
    fn test_empty_host_rejected() {
        let result = ClientConfig::parse("[endpoint]\nhost = \"  \"\nport = 16110\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { field: "host", .. })));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let raw: RawConfig =
            toml::from_str("[endpoint]\nhost = \"file-host\"\nport = 1\ntls = true\n").unwrap();
        let overrides = EndpointOverrides {
            host: Some("flag-host".to_string()),
            tls: Some(false),
            ..Default::default()
        };

        let config = ClientConfig::from_raw(raw, &overrides).unwrap();
        assert_eq!(config.endpoint.host, "flag-host");
        assert_eq!(config.endpoint.port, 1);
        assert!(!config.endpoint.tls);
    }

    #[test]
    fn test_invalid_toml() {
        let result = ClientConfig::parse("[endpoint\nhost=");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
