//! Wallet reached over an EIP-1193 style JSON-RPC endpoint.

use std::time::Duration;

use alloy_core::primitives::{Address, B256, Bytes};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use super::{ReceiptLog, TxReceipt, TxRequest, Wallet};
use crate::{ChainDescriptor, ChainId, LaunchpadError, rpc};

/// Default endpoint of a local wallet bridge.
pub const DEFAULT_WALLET_RPC_URL: &str = "http://127.0.0.1:1248";

/// JSON-RPC code for an unsupported method.
const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// A wallet exposing the standard provider methods over HTTP JSON-RPC.
///
/// Works with desktop wallet bridges and with development nodes that keep
/// their accounts unlocked.
#[derive(Debug, Clone)]
pub struct RpcWallet {
    client: reqwest::Client,
    url: Url,
    /// Pinned sender; when unset the first account the wallet exposes is used.
    account: Option<Address>,
}

impl RpcWallet {
    /// `request_timeout` bounds every call, including the time a user takes
    /// to answer a wallet prompt.
    pub fn new(url: Url, request_timeout: Duration) -> Result<Self, LaunchpadError> {
        Ok(Self {
            client: rpc::create_client(request_timeout)?,
            url,
            account: None,
        })
    }

    pub fn with_account(mut self, account: Option<Address>) -> Self {
        self.account = account;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, LaunchpadError> {
        tracing::trace!(method, url = %self.url, "Wallet request");
        rpc::json_rpc_call(&self.client, self.url.as_str(), method, params).await
    }

    async fn accounts(&self) -> Result<Vec<Address>, LaunchpadError> {
        match self.call("eth_requestAccounts", vec![]).await {
            Err(LaunchpadError::Rpc { code, .. }) if code == METHOD_NOT_FOUND_CODE => {
                tracing::debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.call("eth_accounts", vec![]).await
            }
            result => result,
        }
    }
}

impl Wallet for RpcWallet {
    async fn account(&self) -> Result<Address, LaunchpadError> {
        if let Some(account) = self.account {
            return Ok(account);
        }

        self.accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LaunchpadError::validation("wallet exposes no account, connect one first"))
    }

    async fn chain_id(&self) -> Result<ChainId, LaunchpadError> {
        let hex: String = self.call("eth_chainId", vec![]).await?;
        ChainId::new(rpc::parse_quantity(&hex)?)
    }

    async fn send_transaction(&self, tx: &TxRequest) -> Result<B256, LaunchpadError> {
        let params = serde_json::to_value(tx)
            .map_err(|e| LaunchpadError::validation(format!("unencodable transaction: {}", e)))?;
        self.call("eth_sendTransaction", vec![params]).await
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>, LaunchpadError> {
        let receipt: Option<RpcReceipt> = self
            .call("eth_getTransactionReceipt", vec![serde_json::json!(hash)])
            .await?;

        receipt.map(RpcReceipt::into_receipt).transpose()
    }

    async fn add_chain(&self, descriptor: &ChainDescriptor) -> Result<(), LaunchpadError> {
        let params = serde_json::to_value(descriptor)
            .map_err(|e| LaunchpadError::validation(format!("unencodable chain: {}", e)))?;
        let _: Value = self.call("wallet_addEthereumChain", vec![params]).await?;
        Ok(())
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), LaunchpadError> {
        let _: Value = self
            .call(
                "wallet_switchEthereumChain",
                vec![serde_json::json!({ "chainId": chain_id.to_hex() })],
            )
            .await?;
        Ok(())
    }
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    block_number: Option<String>,
    /// Missing on pre-Byzantium chains, which cannot report reverts.
    status: Option<String>,
    contract_address: Option<Address>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

#[derive(Debug, Deserialize)]
struct RpcLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

impl RpcReceipt {
    fn into_receipt(self) -> Result<TxReceipt, LaunchpadError> {
        let success = match self.status.as_deref() {
            None => true,
            Some(status) => rpc::parse_quantity(status)? == 1,
        };

        Ok(TxReceipt {
            transaction_hash: self.transaction_hash,
            block_number: self
                .block_number
                .as_deref()
                .map(rpc::parse_quantity)
                .transpose()?,
            success,
            contract_address: self.contract_address,
            logs: self
                .logs
                .into_iter()
                .map(|log| ReceiptLog {
                    address: log.address,
                    topics: log.topics,
                    data: log.data,
                })
                .collect(),
        })
    }
}
