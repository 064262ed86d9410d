//! Protocol configuration.
//!
//! Timing windows, caps and the rebox fee are fixed for the lifetime of a
//! controller. They are validated once, at construction or file load,
//! and never change afterwards.

use crate::primitives::Amount;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of recent block hashes the host oracle retains.
pub const BLOCKHASH_RETENTION: u64 = 256;

/// Largest retention window a configuration may declare.
pub const MAX_BLOCKHASH_RETENTION: u64 = 65_536;

/// Basis-point denominator for the rebox fee.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Immutable protocol parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Blocks after commit during which reveal is not yet allowed.
    pub reveal_delay: u64,
    /// Additional blocks after the reveal delay before a third party may
    /// force the reveal.
    pub grace: u64,
    /// Blocks after commit after which reveal and force-reveal are barred
    /// and cancel becomes possible.
    pub max_reveal_window: u64,
    /// Byte cap on reveal data.
    pub data_max: usize,
    /// Largest amount a single observation may escrow.
    #[serde(with = "amount_serde")]
    pub max_observe_amount: Amount,
    /// Largest number of pairs a single rebox may burn.
    #[serde(with = "amount_serde")]
    pub max_rebox_pairs: Amount,
    /// Rebox fee in basis points of 10,000.
    pub rebox_fee_bps: u16,
    /// How many recent block hashes the oracle keeps.
    pub blockhash_retention: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            reveal_delay: 5,
            grace: 64,
            max_reveal_window: 255,
            data_max: 256,
            max_observe_amount: 1_000_000_000 * 10u128.pow(18), // 1e9 whole units at 18 decimals
            max_rebox_pairs: 10u128.pow(33),
            rebox_fee_bps: 250, // 2.5%
            blockhash_retention: BLOCKHASH_RETENTION,
        }
    }
}

impl ProtocolConfig {
    /// Largest `max_rebox_pairs` for which `2 * pairs * 10_000` fits in
    /// the amount width.
    pub const REBOX_PAIRS_CEILING: Amount = Amount::MAX / (2 * BPS_DENOMINATOR);

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blockhash_retention > MAX_BLOCKHASH_RETENTION {
            return Err(ConfigError::RetentionTooLarge {
                retention: self.blockhash_retention,
                max: MAX_BLOCKHASH_RETENTION,
            });
        }
        if self.max_reveal_window >= self.blockhash_retention {
            return Err(ConfigError::WindowExceedsRetention {
                window: self.max_reveal_window,
                retention: self.blockhash_retention,
            });
        }
        let force_opens = self
            .reveal_delay
            .checked_add(self.grace)
            .ok_or(ConfigError::InvalidTiming)?;
        if force_opens >= self.max_reveal_window {
            return Err(ConfigError::InvalidTiming);
        }
        if u128::from(self.rebox_fee_bps) > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidFeeBps(self.rebox_fee_bps));
        }
        if self.max_rebox_pairs == 0 || self.max_rebox_pairs > Self::REBOX_PAIRS_CEILING {
            return Err(ConfigError::InvalidReboxCap);
        }
        if self.max_observe_amount == 0 {
            return Err(ConfigError::InvalidObserveCap);
        }
        Ok(())
    }

    /// First block offset (relative to the commit block) at which a
    /// third party may force the reveal.
    #[inline]
    pub fn force_offset(&self) -> u64 {
        self.reveal_delay.saturating_add(self.grace)
    }
}

/// Parameters of the simulated host chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Chain identifier mixed into every resolution.
    pub chain_id: u64,
    /// Seconds between blocks.
    pub block_time_secs: u32,
    /// Optional fixed seed (hex). Random when absent.
    pub seed: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            block_time_secs: 12,
            seed: None,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("reveal window {window} must be shorter than oracle retention {retention}")]
    WindowExceedsRetention { window: u64, retention: u64 },
    #[error("oracle retention {retention} exceeds maximum {max}")]
    RetentionTooLarge { retention: u64, max: u64 },
    #[error("reveal delay plus grace must end before the reveal window closes")]
    InvalidTiming,
    #[error("invalid fee bps {0} (must be 0..=10000)")]
    InvalidFeeBps(u16),
    #[error("invalid rebox pair cap")]
    InvalidReboxCap,
    #[error("invalid observe amount cap")]
    InvalidObserveCap,
    #[error("invalid simulation seed: {0}")]
    InvalidSeed(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[protocol]` table.
    #[serde(default)]
    pub protocol: ProtocolConfig,
    /// `[simulation]` table.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.protocol.validate()?;
        Ok(config)
    }
}

/// Amounts exceed the TOML integer range, so they are written as decimal
/// strings. Plain integers are accepted on input.
mod amount_serde {
    use crate::primitives::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Int(v) => Ok(Amount::from(v)),
            Repr::Str(s) => s
                .replace('_', "")
                .parse::<Amount>()
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ProtocolConfig::default().validate().is_ok());
    }

    #[test]
    fn test_window_must_fit_retention() {
        let config = ProtocolConfig {
            max_reveal_window: 256,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WindowExceedsRetention { .. })
        ));
    }

    #[test]
    fn test_force_must_open_inside_window() {
        let config = ProtocolConfig {
            reveal_delay: 200,
            grace: 55,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming));
    }

    #[test]
    fn test_fee_bps_bounded() {
        let config = ProtocolConfig {
            rebox_fee_bps: 10_001,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFeeBps(10_001)));
    }

    #[test]
    fn test_rebox_cap_bounded() {
        let config = ProtocolConfig {
            max_rebox_pairs: ProtocolConfig::REBOX_PAIRS_CEILING + 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidReboxCap));
    }

    #[test]
    fn test_parse_toml_with_string_amounts() {
        let text = r#"
            [protocol]
            reveal_delay = 3
            grace = 10
            max_observe_amount = "5_000_000_000_000_000_000_000"
            max_rebox_pairs = 1000

            [simulation]
            chain_id = 31337
        "#;
        let config = FileConfig::from_toml(text).unwrap();
        assert_eq!(config.protocol.reveal_delay, 3);
        assert_eq!(config.protocol.grace, 10);
        assert_eq!(config.protocol.max_observe_amount, 5_000_000_000_000_000_000_000);
        assert_eq!(config.protocol.max_rebox_pairs, 1000);
        assert_eq!(config.protocol.max_reveal_window, 255);
        assert_eq!(config.simulation.chain_id, 31337);
    }

    #[test]
    fn test_retention_bounded() {
        let text = "[protocol]\nblockhash_retention = 9223372036854775807\n";
        assert_eq!(
            FileConfig::from_toml(text).unwrap_err(),
            ConfigError::RetentionTooLarge {
                retention: 9_223_372_036_854_775_807,
                max: MAX_BLOCKHASH_RETENTION,
            }
        );

        let config = ProtocolConfig {
            blockhash_retention: MAX_BLOCKHASH_RETENTION,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_file_config_rejected() {
        let text = "[protocol]\nmax_reveal_window = 300\n";
        assert!(matches!(
            FileConfig::from_toml(text),
            Err(ConfigError::WindowExceedsRetention { .. })
        ));
    }
}
