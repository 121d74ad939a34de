//! Contract standards and deployment mode selection.

use serde::{Deserialize, Serialize};

use crate::{ChainId, FactoryRegistry, lookup_factory};

/// Token standard of a collection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ContractStandard {
    /// ERC-721A collection with a capped supply.
    #[strum(to_string = "ERC721", serialize = "erc721", serialize = "erc-721")]
    Erc721,
    /// ERC-1155 multi-token collection.
    #[strum(to_string = "ERC1155", serialize = "erc1155", serialize = "erc-1155")]
    Erc1155,
}

/// How a collection gets onto the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum DeploymentMode {
    /// Call `deployCollection` on a pre-deployed factory.
    Factory,
    /// Broadcast bytecode and constructor arguments.
    Direct,
}

/// Pick the deployment mode from the built-in factory table.
///
/// Factories only create ERC-721 collections, so ERC-1155 is always direct.
pub fn select_mode(chain_id: ChainId, standard: ContractStandard) -> DeploymentMode {
    mode_for(lookup_factory(chain_id).is_some(), standard)
}

impl FactoryRegistry {
    /// Same rule as [`select_mode`], including configured factories.
    pub fn select_mode(&self, chain_id: ChainId, standard: ContractStandard) -> DeploymentMode {
        mode_for(self.lookup(chain_id).is_some(), standard)
    }
}

fn mode_for(has_factory: bool, standard: ContractStandard) -> DeploymentMode {
    match standard {
        ContractStandard::Erc721 if has_factory => DeploymentMode::Factory,
        _ => DeploymentMode::Direct,
    }
}
