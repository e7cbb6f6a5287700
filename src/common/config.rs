//! Configuration for dstripe components

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default coordinator listen port (bottom of the management-port range)
pub const DEFAULT_COORD_PORT: u16 = 2500;

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Bind address for the UDP control endpoint
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Registration and allocation policy
    #[serde(default)]
    pub policy: Policy,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_COORD_PORT))
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            policy: Policy::default(),
            log_level: default_log_level(),
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from an optional TOML file plus `DSTRIPE__`-prefixed
    /// environment variables (environment wins over file, CLI flags win over
    /// both in the binary).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("DSTRIPE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        cfg.try_deserialize()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Coordinator-wide policy constants: the valid management-port range and the
/// striping-unit bounds are configuration, not per-request data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Lowest acceptable management/command port (inclusive)
    #[serde(default = "default_port_min")]
    pub port_min: u16,

    /// Highest acceptable management/command port (inclusive)
    #[serde(default = "default_port_max")]
    pub port_max: u16,

    /// Smallest acceptable striping unit in bytes (inclusive)
    #[serde(default = "default_striping_unit_min")]
    pub striping_unit_min: u32,

    /// Largest acceptable striping unit in bytes (inclusive)
    #[serde(default = "default_striping_unit_max")]
    pub striping_unit_max: u32,

    /// Minimum number of disks in a storage array
    #[serde(default = "default_min_disks")]
    pub min_disks: usize,
}

fn default_port_min() -> u16 {
    2500
}
fn default_port_max() -> u16 {
    2999
}
fn default_striping_unit_min() -> u32 {
    128
}
fn default_striping_unit_max() -> u32 {
    1_000_000
}
fn default_min_disks() -> usize {
    3
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            port_min: default_port_min(),
            port_max: default_port_max(),
            striping_unit_min: default_striping_unit_min(),
            striping_unit_max: default_striping_unit_max(),
            min_disks: default_min_disks(),
        }
    }
}

impl Policy {
    /// Is this port inside the acceptable management-port range?
    pub fn valid_port(&self, port: u16) -> bool {
        (self.port_min..=self.port_max).contains(&port)
    }

    /// Is this a power of two inside the acceptable striping-unit range?
    pub fn valid_striping_unit(&self, bytes: u32) -> bool {
        bytes.is_power_of_two()
            && (self.striping_unit_min..=self.striping_unit_max).contains(&bytes)
    }
}

/// Configuration for a disk or user agent process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent name (unique among its kind)
    pub name: String,

    /// Local address the agent's sockets bind to
    pub ip: String,

    /// Management port (coordinator traffic)
    pub mport: u16,

    /// Command port (reserved for peer traffic)
    pub cport: u16,

    /// Coordinator control endpoint
    pub coordinator: SocketAddr,

    /// How long to wait for a coordinator response
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl AgentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_policy_defaults() {
        let policy = Policy::default();
        assert_eq!(policy.port_min, 2500);
        assert_eq!(policy.port_max, 2999);
        assert_eq!(policy.striping_unit_min, 128);
        assert_eq!(policy.striping_unit_max, 1_000_000);
        assert_eq!(policy.min_disks, 3);
    }

    #[test]
    fn test_valid_port() {
        let policy = Policy::default();
        assert!(policy.valid_port(2500));
        assert!(policy.valid_port(2750));
        assert!(policy.valid_port(2999));
        assert!(!policy.valid_port(2499));
        assert!(!policy.valid_port(3000));
        assert!(!policy.valid_port(0));
    }

    #[test]
    fn test_valid_striping_unit() {
        let policy = Policy::default();
        // In range and a power of two
        assert!(policy.valid_striping_unit(128));
        assert!(policy.valid_striping_unit(4096));
        assert!(policy.valid_striping_unit(524_288));
        // Out of range
        assert!(!policy.valid_striping_unit(0));
        assert!(!policy.valid_striping_unit(127));
        assert!(!policy.valid_striping_unit(64));
        assert!(!policy.valid_striping_unit(1_000_001));
        assert!(!policy.valid_striping_unit(1_048_576));
        // In range but not a power of two
        assert!(!policy.valid_striping_unit(1000));
        assert!(!policy.valid_striping_unit(1_000_000));
    }

    #[test]
    fn test_coordinator_config_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.bind_addr.port(), DEFAULT_COORD_PORT);
        assert_eq!(config.log_level, "info");
        assert!(config.policy.valid_port(2500));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "bind_addr = \"127.0.0.1:2600\"").unwrap();
        writeln!(file, "[policy]").unwrap();
        writeln!(file, "port_min = 2000").unwrap();
        file.flush().unwrap();

        let config = CoordinatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.bind_addr.port(), 2600);
        assert_eq!(config.policy.port_min, 2000);
        // Unspecified fields keep their defaults
        assert_eq!(config.policy.port_max, 2999);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_agent_config_timeout() {
        let config = AgentConfig {
            name: "d1".to_string(),
            ip: "127.0.0.1".to_string(),
            mport: 2501,
            cport: 2502,
            coordinator: "127.0.0.1:2500".parse().unwrap(),
            request_timeout_secs: 3,
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }
}
