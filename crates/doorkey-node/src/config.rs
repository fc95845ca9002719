//! Node configuration.
//!
//! All values default to the compile-time constants in
//! [`doorkey_core::constants`]; a configuration file only needs to name what
//! it changes.
//!
//! # Examples
//!
//! ```
//! use doorkey_core::DeviceAddress;
//! use doorkey_node::NodeConfig;
//!
//! let config = NodeConfig::default()
//!     .with_device_address(DeviceAddress::new(4))
//!     .with_relay_hold_ms(3000);
//!
//! assert_eq!(config.device_address.as_u8(), 4);
//! assert_eq!(config.relay_hold_ms, 3000);
//! assert_eq!(config.indicator_hold_ms, 5000);
//! assert!(config.validate().is_ok());
//! ```

use doorkey_core::{DeviceAddress, Error, Result, constants::*};
use serde::{Deserialize, Serialize};

/// Runtime parameters of one door node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address this node answers to on the bus.
    pub device_address: DeviceAddress,

    /// How long the door strike stays engaged after an unlock.
    pub relay_hold_ms: u32,

    /// How long the green or red indicator stays lit.
    pub indicator_hold_ms: u32,

    /// Interval between one-wire presence searches.
    pub token_search_interval_ms: u32,

    /// How long a token that stopped answering is still reported present.
    pub token_keep_interval_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            device_address: DeviceAddress::new(DEFAULT_DEVICE_ADDRESS),
            relay_hold_ms: DEFAULT_RELAY_HOLD_MS,
            indicator_hold_ms: DEFAULT_INDICATOR_HOLD_MS,
            token_search_interval_ms: DEFAULT_TOKEN_SEARCH_INTERVAL_MS,
            token_keep_interval_ms: DEFAULT_TOKEN_KEEP_INTERVAL_MS,
        }
    }
}

impl NodeConfig {
    pub fn with_device_address(mut self, address: DeviceAddress) -> Self {
        self.device_address = address;
        self
    }

    pub fn with_relay_hold_ms(mut self, ms: u32) -> Self {
        self.relay_hold_ms = ms;
        self
    }

    pub fn with_indicator_hold_ms(mut self, ms: u32) -> Self {
        self.indicator_hold_ms = ms;
        self
    }

    pub fn with_token_search_interval_ms(mut self, ms: u32) -> Self {
        self.token_search_interval_ms = ms;
        self
    }

    pub fn with_token_keep_interval_ms(mut self, ms: u32) -> Self {
        self.token_keep_interval_ms = ms;
        self
    }

    /// Check the configuration for values the node cannot honor.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a hold duration is zero, or if the token
    /// keep window is shorter than the search interval (a present token
    /// would be forgotten between two searches).
    pub fn validate(&self) -> Result<()> {
        if self.relay_hold_ms == 0 {
            return Err(Error::Config("relay_hold_ms must be greater than zero".into()));
        }
        if self.indicator_hold_ms == 0 {
            return Err(Error::Config(
                "indicator_hold_ms must be greater than zero".into(),
            ));
        }
        if self.token_keep_interval_ms < self.token_search_interval_ms {
            return Err(Error::Config(format!(
                "token_keep_interval_ms ({}) must not be shorter than token_search_interval_ms ({})",
                self.token_keep_interval_ms, self.token_search_interval_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_match_constants() {
        let config = NodeConfig::default();
        assert_eq!(config.device_address, DeviceAddress::new(0));
        assert_eq!(config.relay_hold_ms, 5000);
        assert_eq!(config.indicator_hold_ms, 5000);
        assert_eq!(config.token_search_interval_ms, 50);
        assert_eq!(config.token_keep_interval_ms, 2000);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(NodeConfig::default().with_relay_hold_ms(0))]
    #[case(NodeConfig::default().with_indicator_hold_ms(0))]
    #[case(NodeConfig::default().with_token_search_interval_ms(100).with_token_keep_interval_ms(50))]
    fn test_invalid_configs(#[case] config: NodeConfig) {
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: NodeConfig = toml::from_str(
            r#"
            device_address = 12
            relay_hold_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.device_address.as_u8(), 12);
        assert_eq!(config.relay_hold_ms, 2500);
        assert_eq!(config.indicator_hold_ms, DEFAULT_INDICATOR_HOLD_MS);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = NodeConfig::default().with_device_address(DeviceAddress::new(9));
        let json = serde_json::to_string(&config).unwrap();
        let back: NodeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
