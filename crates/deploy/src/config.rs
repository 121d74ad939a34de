use std::{path::Path, time::Duration};

use alloy_core::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    ArtifactPaths, FactoryEntry, FactoryRegistry, MintStrategy, PinningConfig, SequencerConfig,
    chainlist::DEFAULT_CHAIN_LIST_URL, rpc, wallet::DEFAULT_WALLET_RPC_URL,
};

/// The default name for the mintpad configuration file.
pub const CONFIG_FILENAME: &str = "Mintpad.toml";

/// Everything needed to reach the wallet and the external services.
///
/// Serialized to/from TOML. Missing keys take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    /// JSON-RPC endpoint of the wallet.
    pub wallet_rpc_url: Url,
    /// Sender to use instead of the wallet's first account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Address>,
    /// Timeout of one HTTP request, wallet prompts included.
    pub request_timeout_secs: u64,
    /// Delay between receipt polls.
    pub poll_interval_ms: u64,
    /// Give up waiting for a receipt after this long. Unset waits forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_timeout_secs: Option<u64>,
    pub mint_strategy: MintStrategy,
    /// Value attached to each ERC-721 token minted, in wei.
    #[serde(with = "wei")]
    pub mint_price_wei: U256,
    pub chain_list_url: Url,

    pub pinning: PinningConfig,
    pub artifacts: ArtifactPaths,
    /// Factories added to, or overriding, the built-in table.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub factories: Vec<FactoryEntry>,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            wallet_rpc_url: Url::parse(DEFAULT_WALLET_RPC_URL).expect("valid default wallet URL"),
            account: None,
            request_timeout_secs: rpc::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            poll_interval_ms: rpc::DEFAULT_POLL_INTERVAL.as_millis() as u64,
            receipt_timeout_secs: None,
            mint_strategy: MintStrategy::default(),
            mint_price_wei: U256::ZERO,
            chain_list_url: Url::parse(DEFAULT_CHAIN_LIST_URL)
                .expect("valid default chain list URL"),
            pinning: PinningConfig::default(),
            artifacts: ArtifactPaths::default(),
            factories: Vec::new(),
        }
    }
}

impl LaunchpadConfig {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize launchpad config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file, or from [`CONFIG_FILENAME`] inside a directory.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(CONFIG_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config from {}", config_path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            receipt_timeout: self.receipt_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn registry(&self) -> FactoryRegistry {
        FactoryRegistry::new(self.factories.iter().copied())
    }

    /// HTTP client for the chain list and pinning service.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        rpc::create_client(self.request_timeout()).context("Failed to create HTTP client")
    }
}

/// Wei amounts as decimal strings. Integers are accepted on input.
mod wei {
    use alloy_core::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Int(value) => Ok(U256::from(value)),
            Raw::Str(value) => {
                U256::from_str_radix(value.trim(), 10).map_err(|e| D::Error::custom(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::address;

    use super::*;
    use crate::ChainId;

    #[test]
    fn test_defaults() {
        let config = LaunchpadConfig::default();
        assert_eq!(config.wallet_rpc_url.as_str(), "http://127.0.0.1:1248/");
        assert_eq!(config.sequencer_config(), SequencerConfig::default());
        assert_eq!(config.mint_strategy, MintStrategy::Sequential);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: LaunchpadConfig = toml::from_str(
            r#"
            mint_strategy = "native"
            mint_price_wei = 10000000000000000
            receipt_timeout_secs = 300

            [pinning]
            api_key = "key"

            [[factories]]
            chain_id = 31337
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            "#,
        )
        .unwrap();

        assert_eq!(config.mint_strategy, MintStrategy::Native);
        assert_eq!(config.mint_price_wei, U256::from(10_000_000_000_000_000u64));
        assert_eq!(
            config.sequencer_config().receipt_timeout,
            Some(Duration::from_secs(300))
        );
        assert_eq!(config.pinning.api_key.as_deref(), Some("key"));
        assert_eq!(config.pinning.gateway, PinningConfig::default().gateway);
        assert_eq!(
            config.registry().lookup(ChainId::new(31337).unwrap()),
            Some(address!("5FbDB2315678afecb367f032d93F642f64180aa3"))
        );
    }

    #[test]
    fn test_factory_with_zero_chain_id_is_rejected() {
        let result = toml::from_str::<LaunchpadConfig>(
            r#"
            [[factories]]
            chain_id = 0
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            "#,
        );

        let err = result.unwrap_err().to_string();
        assert!(err.contains("chain id must be positive"), "{err}");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir::TempDir::new("mintpad-config").unwrap();
        let config = LaunchpadConfig {
            account: Some(address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")),
            mint_price_wei: U256::from(5),
            factories: vec![FactoryEntry {
                chain_id: ChainId::new(1).unwrap(),
                address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            }],
            ..Default::default()
        };

        config.save_to_file(&dir.path().join(CONFIG_FILENAME)).unwrap();
        let loaded = LaunchpadConfig::load_from_file(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir::TempDir::new("mintpad-config").unwrap();
        assert!(LaunchpadConfig::load_from_file(&dir.path().join("nope.toml")).is_err());
    }
}
