//! Configuration file handling.
//!
//! ```toml
//! [node]
//! device_address = 3
//! relay_hold_ms = 4000
//!
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 115200
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use crate::args::RunArgs;
use anyhow::{Context, Result};
use doorkey_core::{DeviceAddress, constants::DEFAULT_BAUD_RATE};
use doorkey_node::NodeConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub node: NodeConfig,
    pub serial: SerialConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial device path
    pub port: Option<String>,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

impl CliConfig {
    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, args: &RunArgs) {
        if let Some(port) = &args.port {
            self.serial.port = Some(port.clone());
        }
        if let Some(baud) = args.baud {
            self.serial.baud_rate = baud;
        }
        if let Some(address) = args.address {
            self.node.device_address = DeviceAddress::new(address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args() -> RunArgs {
        RunArgs {
            port: None,
            baud: None,
            address: None,
            config: None,
            token: None,
        }
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(CliConfig::parse("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = CliConfig::parse(
            r#"
            [node]
            device_address = 3
            relay_hold_ms = 4000

            [serial]
            port = "/dev/ttyUSB0"
            "#,
        )
        .unwrap();

        assert_eq!(config.node.device_address, DeviceAddress::new(3));
        assert_eq!(config.node.relay_hold_ms, 4000);
        assert_eq!(config.node.indicator_hold_ms, NodeConfig::default().indicator_hold_ms);
        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.serial.baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(CliConfig::parse("[node]\ndevice_address = 300\n").is_err());
        assert!(CliConfig::parse("[serial]\nbaud_rate = \"fast\"\n").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = CliConfig::parse("[node]\ndevice_address = 3\n[serial]\nport = \"/dev/a\"\n").unwrap();
        let args = RunArgs {
            port: Some("/dev/b".to_string()),
            address: Some(9),
            ..run_args()
        };
        config.apply(&args);

        assert_eq!(config.serial.port.as_deref(), Some("/dev/b"));
        assert_eq!(config.node.device_address, DeviceAddress::new(9));
        assert_eq!(config.serial.baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let mut config = CliConfig::parse("[serial]\nbaud_rate = 9600\n").unwrap();
        config.apply(&run_args());
        assert_eq!(config.serial.baud_rate, 9600);
    }

    #[test]
    fn test_missing_file() {
        let error = CliConfig::load(Path::new("/nonexistent/doorkey.toml")).unwrap_err();
        assert!(error.to_string().contains("reading config file"));
    }
}
