//! Custom network descriptors and wallet network requests.

use serde::{Deserialize, Serialize};

use crate::{ChainId, LaunchpadError, Session, Wallet};

/// Decimals every EVM native currency is declared with.
pub const NATIVE_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    /// A currency whose name is its symbol.
    pub fn from_symbol(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            decimals: NATIVE_DECIMALS,
        }
    }
}

/// Parameter object of `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    /// `0x`-prefixed hex.
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorer_urls: Option<Vec<String>>,
}

/// A network as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomNetwork {
    /// Decimal or `0x` hex.
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_url: String,
    pub currency_symbol: String,
    pub block_explorer: Option<String>,
}

impl CustomNetwork {
    pub fn descriptor(&self) -> Result<ChainDescriptor, LaunchpadError> {
        let chain_id = ChainId::parse_user_input(&self.chain_id)?;

        let chain_name = self.chain_name.trim();
        if chain_name.is_empty() {
            return Err(LaunchpadError::validation("chain name is required"));
        }

        let rpc_url = self.rpc_url.trim();
        if rpc_url.is_empty() {
            return Err(LaunchpadError::validation("RPC URL is required"));
        }

        let symbol = self.currency_symbol.trim();
        if symbol.is_empty() {
            return Err(LaunchpadError::validation("currency symbol is required"));
        }

        let block_explorer_urls = self
            .block_explorer
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| vec![url.to_string()]);

        Ok(ChainDescriptor {
            chain_id: chain_id.to_hex(),
            chain_name: chain_name.to_string(),
            native_currency: NativeCurrency::from_symbol(symbol),
            rpc_urls: vec![rpc_url.to_string()],
            block_explorer_urls,
        })
    }
}

/// Ask the wallet to add `descriptor`, then read back the resulting session.
///
/// Most wallets switch to the added network on approval; the returned session
/// shows whether that happened.
pub async fn add_network<W: Wallet>(
    wallet: &W,
    descriptor: &ChainDescriptor,
) -> Result<Session, LaunchpadError> {
    tracing::info!(
        chain_id = %descriptor.chain_id,
        chain_name = %descriptor.chain_name,
        "Requesting wallet to add network"
    );

    wallet.add_chain(descriptor).await?;
    let session = Session::read(wallet).await?;

    tracing::info!(chain_id = %session.chain_id, account = %session.account, "Wallet network updated");
    Ok(session)
}

/// Ask the wallet to switch to `chain_id`, then read back the resulting session.
pub async fn switch_network<W: Wallet>(
    wallet: &W,
    chain_id: ChainId,
) -> Result<Session, LaunchpadError> {
    tracing::info!(%chain_id, "Requesting wallet to switch network");
    wallet.switch_chain(chain_id).await?;
    Session::read(wallet).await
}
