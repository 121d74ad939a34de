//! Builder module for creating a [`Launchpad`].
//!
//! This module provides the [`LaunchpadBuilder`] struct which wires a wallet to
//! the factory registry, contract artifacts and sequencing settings, either by
//! hand or from a [`LaunchpadConfig`].

use std::sync::atomic::AtomicBool;

use alloy_core::primitives::U256;
use anyhow::{Context, Result};

use crate::{
    ContractArtifacts, FactoryRegistry, Launchpad, LaunchpadConfig, MintStrategy, RpcWallet,
    SequencerConfig,
};

/// Builder for creating a [`Launchpad`].
///
/// # Example
///
/// ```no_run
/// use mintpad_deploy::{LaunchpadBuilder, LaunchpadConfig};
///
/// # fn example() -> anyhow::Result<()> {
/// let launchpad = LaunchpadBuilder::from_config(&LaunchpadConfig::default())?.build();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LaunchpadBuilder<W> {
    wallet: W,
    registry: FactoryRegistry,
    artifacts: ContractArtifacts,
    sequencer: SequencerConfig,
    mint_strategy: MintStrategy,
    mint_price: U256,
}

impl<W> LaunchpadBuilder<W> {
    /// Create a new [`LaunchpadBuilder`] around a wallet, with the built-in
    /// factory table and no bytecode artifacts.
    pub fn new(wallet: W) -> Self {
        Self {
            wallet,
            registry: FactoryRegistry::default(),
            artifacts: ContractArtifacts::default(),
            sequencer: SequencerConfig::default(),
            mint_strategy: MintStrategy::default(),
            mint_price: U256::ZERO,
        }
    }

    pub fn registry(mut self, registry: FactoryRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the creation bytecode used by direct deployments.
    pub fn artifacts(mut self, artifacts: ContractArtifacts) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn sequencer(mut self, sequencer: SequencerConfig) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn mint_strategy(mut self, strategy: MintStrategy) -> Self {
        self.mint_strategy = strategy;
        self
    }

    /// Set the value attached to each ERC-721 token minted, in wei.
    pub fn mint_price(mut self, price: U256) -> Self {
        self.mint_price = price;
        self
    }

    pub fn build(self) -> Launchpad<W> {
        Launchpad {
            wallet: self.wallet,
            registry: self.registry,
            artifacts: self.artifacts,
            sequencer: self.sequencer,
            mint_strategy: self.mint_strategy,
            mint_price: self.mint_price,
            busy: AtomicBool::new(false),
        }
    }
}

impl LaunchpadBuilder<RpcWallet> {
    /// Builder for the JSON-RPC wallet described by `config`.
    ///
    /// Configured artifacts are read from disk here.
    pub fn from_config(config: &LaunchpadConfig) -> Result<Self> {
        let wallet = RpcWallet::new(config.wallet_rpc_url.clone(), config.request_timeout())
            .context("Failed to create wallet client")?
            .with_account(config.account);

        let artifacts = ContractArtifacts::load(&config.artifacts)
            .context("Failed to load contract artifacts")?;

        tracing::debug!(
            wallet = %config.wallet_rpc_url,
            factories = config.factories.len(),
            strategy = %config.mint_strategy,
            "Building launchpad from configuration"
        );

        Ok(Self::new(wallet)
            .registry(config.registry())
            .artifacts(artifacts)
            .sequencer(config.sequencer_config())
            .mint_strategy(config.mint_strategy)
            .mint_price(config.mint_price_wei))
    }
}
