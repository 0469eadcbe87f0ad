// crates/greeter-daemon/src/config.rs
//
// Runtime configuration for the Greeter daemon.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;

use serde::Deserialize;
use thiserror::Error;

use greeter_core::AuditMode;
use greeter_rpc::RpcConfig;

/// Environment variable overriding `rpc_port`.
pub const PORT_ENV_VAR: &str = "GRPC_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid GRPC_PORT {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether an audit failure fails the call ("blocking") or is only
    /// logged ("best_effort").
    #[serde(default)]
    pub audit_mode: AuditMode,
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50051
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            audit_mode: AuditMode::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    fn parse(path: &str, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        let port = std::env::var(PORT_ENV_VAR).ok();
        self.apply_port_override(port.as_deref())
    }

    /// Replace `rpc_port` with `value` when present. Empty values are ignored.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };
        self.rpc_port = value.parse().map_err(|source| ConfigError::InvalidPort {
            value: value.to_string(),
            source,
        })?;
        Ok(())
    }

    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            host: self.rpc_host.clone(),
            port: self.rpc_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.rpc_port, 50051);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.audit_mode, AuditMode::Blocking);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = DaemonConfig::parse(
            "greeter.toml",
            "rpc_port = 6000\naudit_mode = \"best_effort\"\n",
        )
        .unwrap();
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.rpc_port, 6000);
        assert_eq!(config.audit_mode, AuditMode::BestEffort);
    }

    #[test]
    fn test_unknown_audit_mode_is_rejected() {
        let err = DaemonConfig::parse("greeter.toml", "audit_mode = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = DaemonConfig::load("/nonexistent/greeter.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_port_override() {
        let mut config = DaemonConfig::default();
        config.apply_port_override(Some("7070")).unwrap();
        assert_eq!(config.rpc_port, 7070);

        config.apply_port_override(None).unwrap();
        config.apply_port_override(Some("")).unwrap();
        assert_eq!(config.rpc_port, 7070);
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = DaemonConfig::default();
        let err = config.apply_port_override(Some("fifty")).unwrap_err();
        assert!(err.to_string().starts_with("invalid GRPC_PORT"));
        assert_eq!(config.rpc_port, 50051);
    }

    #[test]
    fn test_rpc_config() {
        let mut config = DaemonConfig::default();
        config.rpc_host = "0.0.0.0".to_string();
        let rpc = config.rpc_config();
        assert_eq!(rpc.host, "0.0.0.0");
        assert_eq!(rpc.port, 50051);
    }
}
