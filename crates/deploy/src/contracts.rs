//! Contract interfaces and compiled bytecode artifacts.

use std::path::{Path, PathBuf};

use alloy_core::primitives::Bytes;
use alloy_sol_types::sol;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ContractStandard, LaunchpadError};

sol! {
    /// Pre-deployed factory creating ERC-721A collections.
    contract CollectionFactory {
        function deployCollection(
            string name,
            string symbol,
            string baseTokenURI,
            uint256 maxSupply
        ) external returns (address);

        event CollectionDeployed(address indexed collection, address indexed owner);
    }

    /// ERC-721A collection deployed directly.
    contract ERC721Launchpad {
        constructor(string name, string symbol, string baseTokenURI, uint256 maxSupply);

        function mint(uint256 quantity) external payable;
    }

    /// ERC-1155 collection deployed directly.
    contract ERC1155Launchpad {
        constructor(string uri);

        function mint(address account, uint256 id, uint256 amount, bytes data) public;
    }
}

/// Paths of the compiled contracts used for direct deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erc721: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erc1155: Option<PathBuf>,
}

/// Creation bytecode for each standard.
///
/// A missing artifact only matters once a direct deployment needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractArtifacts {
    erc721: Option<Bytes>,
    erc1155: Option<Bytes>,
}

impl ContractArtifacts {
    pub fn new(erc721: Option<Bytes>, erc1155: Option<Bytes>) -> Self {
        Self { erc721, erc1155 }
    }

    /// Load artifacts from disk.
    ///
    /// Each file is either raw hex bytecode or a Foundry/Hardhat JSON artifact.
    pub fn load(paths: &ArtifactPaths) -> anyhow::Result<Self> {
        Ok(Self {
            erc721: load_optional(paths.erc721.as_deref(), ContractStandard::Erc721)?,
            erc1155: load_optional(paths.erc1155.as_deref(), ContractStandard::Erc1155)?,
        })
    }

    pub fn bytecode(&self, standard: ContractStandard) -> Result<&Bytes, LaunchpadError> {
        let bytecode = match standard {
            ContractStandard::Erc721 => self.erc721.as_ref(),
            ContractStandard::Erc1155 => self.erc1155.as_ref(),
        };

        bytecode.ok_or_else(|| LaunchpadError::InvalidBytecode {
            standard,
            reason: "no artifact configured".to_string(),
        })
    }
}

fn load_optional(path: Option<&Path>, standard: ContractStandard) -> anyhow::Result<Option<Bytes>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} artifact {}", standard, path.display()))?;

    let bytecode = parse_artifact(&content).map_err(|reason| LaunchpadError::InvalidBytecode {
        standard,
        reason: format!("{}: {}", path.display(), reason),
    })?;

    tracing::debug!(%standard, path = %path.display(), size = bytecode.len(), "Loaded contract artifact");

    Ok(Some(bytecode))
}

/// Extract creation bytecode from raw hex or a JSON artifact.
fn parse_artifact(content: &str) -> Result<Bytes, String> {
    let content = content.trim();

    let hex_str = if content.starts_with('{') {
        let json: Value =
            serde_json::from_str(content).map_err(|e| format!("malformed JSON artifact: {}", e))?;

        // Hardhat: "bytecode": "0x..", Foundry: "bytecode": { "object": "0x.." }
        json["bytecode"]
            .as_str()
            .or_else(|| json["bytecode"]["object"].as_str())
            .ok_or_else(|| "artifact has no bytecode field".to_string())?
            .to_string()
    } else {
        content.to_string()
    };

    let digits = hex_str.trim_start_matches("0x");
    if digits.is_empty() {
        return Err("bytecode is empty".to_string());
    }

    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| format!("bytecode is not valid hex: {}", e))
}
