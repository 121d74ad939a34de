//! Error taxonomy for launchpad operations.

use std::time::Duration;

use alloy_core::primitives::B256;

use crate::{ChainId, ContractStandard, TransactionRecord};

/// JSON-RPC error code a wallet returns when the user declines a request (EIP-1193).
pub const USER_REJECTED_CODE: i64 = 4001;

/// Shown when a direct deployment is attempted without usable bytecode.
pub const BYTECODE_HINT: &str =
    "direct deployment requires valid compiled bytecode, set [artifacts] in Mintpad.toml";

/// Errors surfaced to the action that started a deploy, mint, upload or network request.
///
/// None of these are retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum LaunchpadError {
    /// A required input is missing or malformed. Raised before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The pinning service call failed.
    #[error("upload failed: {0}")]
    Upload(String),

    /// The user declined the wallet prompt.
    #[error("request rejected in wallet: {0}")]
    UserRejected(String),

    /// The transaction was mined but its execution reverted.
    #[error("transaction {} reverted", .record.hash)]
    ContractRevert { record: TransactionRecord },

    /// The contract artifact for a direct deployment is missing or is not valid bytecode.
    #[error("invalid bytecode for {standard}: {reason} ({})", BYTECODE_HINT)]
    InvalidBytecode {
        standard: ContractStandard,
        reason: String,
    },

    /// The RPC endpoint could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The RPC endpoint answered with an error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Another deployment or mint is already in flight.
    #[error("another operation is already in progress")]
    Busy,

    /// The wallet moved to another chain while an operation was running.
    #[error("wallet switched from chain {expected} to {actual}, session invalidated")]
    SessionChanged { expected: ChainId, actual: ChainId },

    /// No receipt was observed within the configured timeout.
    #[error("no receipt for {hash} after {timeout:?}")]
    ReceiptTimeout { hash: B256, timeout: Duration },
}

impl LaunchpadError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify a JSON-RPC error object returned by the wallet or node.
    pub fn from_rpc(code: i64, message: String, standard: Option<ContractStandard>) -> Self {
        if code == USER_REJECTED_CODE {
            return Self::UserRejected(message);
        }

        match standard {
            Some(standard) if message.to_lowercase().contains("invalid bytecode") => {
                Self::InvalidBytecode {
                    standard,
                    reason: message,
                }
            }
            _ => Self::Rpc { code, message },
        }
    }

    /// Whether the error happened before anything was sent to the chain.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidBytecode { .. } | Self::Busy
        )
    }
}

impl From<reqwest::Error> for LaunchpadError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
