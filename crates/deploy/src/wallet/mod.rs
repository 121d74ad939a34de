//! Wallet boundary.
//!
//! The wallet owns the keys: it signs and broadcasts what it is given and
//! reports the connected account and network. Everything the launchpad needs
//! from it goes through the [`Wallet`] trait so flows can run against a JSON-RPC
//! wallet bridge or an in-memory double.

mod rpc_wallet;
mod session;

use std::future::Future;

use alloy_core::primitives::{Address, B256, Bytes, U256};
use serde::Serialize;

pub use rpc_wallet::{DEFAULT_WALLET_RPC_URL, RpcWallet};
pub use session::{Session, SessionEvent, watch_session};

use crate::{ChainDescriptor, ChainId, LaunchpadError};

/// A transaction handed to the wallet for signing and broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxRequest {
    pub from: Address,
    /// `None` creates a contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
}

impl TxRequest {
    pub fn call(from: Address, to: Address, data: Bytes) -> Self {
        Self {
            from,
            to: Some(to),
            data,
            value: U256::ZERO,
        }
    }

    pub fn create(from: Address, data: Bytes) -> Self {
        Self {
            from,
            to: None,
            data,
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// A log entry of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// `false` when execution reverted.
    pub success: bool,
    /// Set for contract creations.
    pub contract_address: Option<Address>,
    pub logs: Vec<ReceiptLog>,
}

/// Operations the launchpad needs from a connected wallet.
pub trait Wallet {
    /// The account transactions are sent from.
    fn account(&self) -> impl Future<Output = Result<Address, LaunchpadError>> + Send;

    /// The network the wallet is currently connected to.
    fn chain_id(&self) -> impl Future<Output = Result<ChainId, LaunchpadError>> + Send;

    /// Sign and broadcast `tx`, returning its hash.
    fn send_transaction(
        &self,
        tx: &TxRequest,
    ) -> impl Future<Output = Result<B256, LaunchpadError>> + Send;

    /// The receipt of `hash`, or `None` while it is not mined yet.
    fn transaction_receipt(
        &self,
        hash: B256,
    ) -> impl Future<Output = Result<Option<TxReceipt>, LaunchpadError>> + Send;

    /// Ask the wallet to add a network (`wallet_addEthereumChain`).
    fn add_chain(
        &self,
        descriptor: &ChainDescriptor,
    ) -> impl Future<Output = Result<(), LaunchpadError>> + Send;

    /// Ask the wallet to switch to a known network (`wallet_switchEthereumChain`).
    fn switch_chain(
        &self,
        chain_id: ChainId,
    ) -> impl Future<Output = Result<(), LaunchpadError>> + Send;
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::address;

    use super::*;

    #[test]
    fn test_tx_request_json_shape() {
        let from = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let create = TxRequest::create(from, Bytes::from_static(&[0x60, 0x80]));
        let json = serde_json::to_value(&create).unwrap();

        assert!(json.get("to").is_none());
        assert_eq!(json["data"], "0x6080");
        assert_eq!(json["value"], "0x0");
        assert_eq!(
            json["from"].as_str().unwrap().to_lowercase(),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );

        let call = TxRequest::call(from, from, Bytes::new()).with_value(U256::from(16));
        let json = serde_json::to_value(&call).unwrap();
        assert!(json.get("to").is_some());
        assert_eq!(json["value"], "0x10");
    }
}
