//! Lookup of chain metadata in a public chain list.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ChainDescriptor, LaunchpadError, NativeCurrency, network::NATIVE_DECIMALS};

/// Default chain list, as published by ethereum-lists/chains.
pub const DEFAULT_CHAIN_LIST_URL: &str = "https://chainid.network/chains.json";

/// Maximum number of entries a search returns.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// One entry of the chain list. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub name: String,
    pub chain_id: u64,
    #[serde(default)]
    pub rpc: Vec<String>,
    pub native_currency: NativeCurrency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorers: Option<Vec<Explorer>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explorer {
    pub name: String,
    pub url: String,
}

impl ChainInfo {
    /// Build the add-network request for this chain.
    ///
    /// RPC URLs with `${...}` placeholders need an API key and are dropped.
    pub fn descriptor(&self) -> Result<ChainDescriptor, LaunchpadError> {
        let chain_id = crate::ChainId::new(self.chain_id)?;

        let rpc_urls: Vec<String> = self
            .rpc
            .iter()
            .filter(|url| !url.contains("${"))
            .cloned()
            .collect();

        if rpc_urls.is_empty() {
            return Err(LaunchpadError::validation(format!(
                "chain {} lists no public RPC URL",
                self.name
            )));
        }

        let block_explorer_urls = self
            .explorers
            .as_ref()
            .map(|explorers| explorers.iter().map(|e| e.url.clone()).collect::<Vec<_>>())
            .filter(|urls| !urls.is_empty());

        Ok(ChainDescriptor {
            chain_id: chain_id.to_hex(),
            chain_name: self.name.clone(),
            native_currency: NativeCurrency {
                decimals: NATIVE_DECIMALS,
                ..self.native_currency.clone()
            },
            rpc_urls,
            block_explorer_urls,
        })
    }
}

/// Entries whose name contains `query` (case-insensitively) or whose chain id
/// contains it as a substring, in list order, at most [`MAX_SEARCH_RESULTS`].
pub fn search_chains<'a>(chains: &'a [ChainInfo], query: &str) -> Vec<&'a ChainInfo> {
    let query = query.trim().to_lowercase();

    chains
        .iter()
        .filter(|chain| {
            chain.name.to_lowercase().contains(&query)
                || chain.chain_id.to_string().contains(&query)
        })
        .take(MAX_SEARCH_RESULTS)
        .collect()
}

/// Client for a chain list endpoint.
#[derive(Debug, Clone)]
pub struct ChainListClient {
    client: reqwest::Client,
    url: Url,
}

impl ChainListClient {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Download the whole list.
    pub async fn fetch(&self) -> Result<Vec<ChainInfo>, LaunchpadError> {
        tracing::debug!(url = %self.url, "Fetching chain list");

        let chains: Vec<ChainInfo> = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(count = chains.len(), "Chain list fetched");
        Ok(chains)
    }

    /// Fetch the list and filter it with [`search_chains`].
    pub async fn search(&self, query: &str) -> Result<Vec<ChainInfo>, LaunchpadError> {
        let chains = self.fetch().await?;
        Ok(search_chains(&chains, query).into_iter().cloned().collect())
    }
}
