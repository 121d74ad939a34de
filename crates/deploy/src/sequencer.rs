//! Ordered execution of wallet transactions.
//!
//! A sequence is a list of [`TxStep`]s run strictly one after the other: a
//! step is submitted only once the receipt of the previous one has been
//! observed. Nothing is rolled back when a step fails, so a sequence can end
//! with some steps confirmed and the failure of the next one.

use std::time::Duration;

use alloy_core::primitives::{Address, B256};
use alloy_sol_types::SolEvent;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::{
    ChainId, ContractStandard, DeploymentMode, LaunchpadError, ReceiptLog, TxReceipt, TxRequest,
    Wallet, contracts::CollectionFactory, rpc,
};

/// Lifecycle state of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// A transaction issued by a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: B256,
    pub status: TxStatus,
    /// The deployed collection, when one could be determined.
    pub result_address: Option<Address>,
    pub block_number: Option<u64>,
}

impl TransactionRecord {
    pub fn pending(hash: B256) -> Self {
        Self {
            hash,
            status: TxStatus::Pending,
            result_address: None,
            block_number: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != TxStatus::Pending
    }

    /// Move a pending record to its terminal state. Terminal records are returned untouched.
    pub fn settle(self, receipt: &TxReceipt, result_address: Option<Address>) -> Self {
        if self.is_terminal() {
            return self;
        }

        Self {
            status: if receipt.success {
                TxStatus::Confirmed
            } else {
                TxStatus::Failed
            },
            result_address: receipt.success.then_some(result_address).flatten(),
            block_number: receipt.block_number,
            ..self
        }
    }
}

/// What a step does, which decides how its result is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum StepKind {
    #[strum(to_string = "deploy {standard} ({mode})")]
    Deploy {
        mode: DeploymentMode,
        standard: ContractStandard,
    },
    #[strum(to_string = "mint {index}/{total}")]
    Mint { index: usize, total: usize },
}

impl StepKind {
    /// Attach deployment context to errors raised while submitting.
    fn classify(&self, err: LaunchpadError) -> LaunchpadError {
        match (self, err) {
            (
                Self::Deploy {
                    mode: DeploymentMode::Direct,
                    standard,
                },
                LaunchpadError::Rpc { code, message },
            ) => LaunchpadError::from_rpc(code, message, Some(*standard)),
            (_, err) => err,
        }
    }

    fn result_address(&self, request: &TxRequest, receipt: &TxReceipt) -> Option<Address> {
        match self {
            Self::Deploy {
                mode: DeploymentMode::Direct,
                ..
            } => receipt.contract_address,
            Self::Deploy {
                mode: DeploymentMode::Factory,
                ..
            } => request
                .to
                .and_then(|factory| deployed_collection(factory, &receipt.logs)),
            Self::Mint { .. } => None,
        }
    }
}

/// One transaction of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxStep {
    pub kind: StepKind,
    pub request: TxRequest,
}

impl TxStep {
    pub fn deploy(mode: DeploymentMode, standard: ContractStandard, request: TxRequest) -> Self {
        Self {
            kind: StepKind::Deploy { mode, standard },
            request,
        }
    }

    /// Number `requests` as mint steps `1..=n`.
    pub fn mints(requests: Vec<TxRequest>) -> Vec<Self> {
        let total = requests.len();
        requests
            .into_iter()
            .enumerate()
            .map(|(i, request)| Self {
                kind: StepKind::Mint {
                    index: i + 1,
                    total,
                },
                request,
            })
            .collect()
    }
}

/// Receipt polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    pub poll_interval: Duration,
    /// `None` waits for a receipt indefinitely.
    pub receipt_timeout: Option<Duration>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            poll_interval: rpc::DEFAULT_POLL_INTERVAL,
            receipt_timeout: None,
        }
    }
}

/// Runs steps through a wallet bound to one chain.
#[derive(Debug)]
pub struct Sequencer<'a, W> {
    wallet: &'a W,
    chain_id: ChainId,
    config: SequencerConfig,
}

impl<'a, W: Wallet> Sequencer<'a, W> {
    /// `chain_id` is the chain the steps were planned for.
    pub fn new(wallet: &'a W, chain_id: ChainId, config: SequencerConfig) -> Self {
        Self {
            wallet,
            chain_id,
            config,
        }
    }

    /// Lazily run `steps`, yielding one terminal record per transaction.
    ///
    /// Nothing is submitted until the stream is polled. The stream ends after
    /// the last step or after the first error.
    pub fn execute(
        self,
        steps: Vec<TxStep>,
    ) -> impl Stream<Item = Result<TransactionRecord, LaunchpadError>> + 'a {
        futures::stream::try_unfold(
            (self, steps.into_iter()),
            |(sequencer, mut steps)| async move {
                let Some(step) = steps.next() else {
                    return Ok(None);
                };
                let record = sequencer.run_step(step).await?;
                Ok(Some((record, (sequencer, steps))))
            },
        )
    }

    async fn run_step(&self, step: TxStep) -> Result<TransactionRecord, LaunchpadError> {
        let actual = self.wallet.chain_id().await?;
        if actual != self.chain_id {
            return Err(LaunchpadError::SessionChanged {
                expected: self.chain_id,
                actual,
            });
        }

        let hash = self
            .wallet
            .send_transaction(&step.request)
            .await
            .map_err(|e| step.kind.classify(e))?;

        tracing::info!(tx_hash = %hash, step = %step.kind, "Transaction submitted");

        let record = TransactionRecord::pending(hash);
        let receipt = rpc::poll_until(self.config.poll_interval, self.config.receipt_timeout, || {
            self.wallet.transaction_receipt(hash)
        })
        .await?
        .ok_or_else(|| LaunchpadError::ReceiptTimeout {
            hash,
            timeout: self.config.receipt_timeout.unwrap_or_default(),
        })?;

        let result_address = step.kind.result_address(&step.request, &receipt);
        let record = record.settle(&receipt, result_address);

        if record.status == TxStatus::Failed {
            tracing::warn!(tx_hash = %hash, step = %step.kind, "Transaction reverted");
            return Err(LaunchpadError::ContractRevert { record });
        }

        tracing::info!(
            tx_hash = %hash,
            step = %step.kind,
            block = ?record.block_number,
            result_address = ?record.result_address,
            "Transaction confirmed"
        );

        Ok(record)
    }
}

/// Address announced by a factory's `CollectionDeployed` event.
fn deployed_collection(factory: Address, logs: &[ReceiptLog]) -> Option<Address> {
    logs.iter()
        .filter(|log| log.address == factory)
        .find(|log| log.topics.first() == Some(&CollectionFactory::CollectionDeployed::SIGNATURE_HASH))
        .and_then(|log| log.topics.get(1))
        .map(|topic| Address::from_word(*topic))
}

/// How a sequence ended.
#[derive(Debug, Default)]
pub struct SequenceOutcome {
    /// Records of every confirmed transaction, in order.
    pub confirmed: Vec<TransactionRecord>,
    /// The error that stopped the sequence, if any.
    pub failure: Option<LaunchpadError>,
}

impl SequenceOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn last(&self) -> Option<&TransactionRecord> {
        self.confirmed.last()
    }
}

/// Drive `stream` to its end, reporting each confirmed record to `on_record`.
pub async fn collect_outcome<S>(
    stream: S,
    mut on_record: impl FnMut(&TransactionRecord),
) -> SequenceOutcome
where
    S: Stream<Item = Result<TransactionRecord, LaunchpadError>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut outcome = SequenceOutcome::default();

    while let Some(item) = stream.next().await {
        match item {
            Ok(record) => {
                on_record(&record);
                outcome.confirmed.push(record);
            }
            Err(err) => {
                outcome.failure = Some(err);
                break;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::{Bytes, address, b256};

    use super::*;

    const FACTORY: Address = address!("1234567890123456789012345678901234567890");
    const COLLECTION: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const HASH: B256 = b256!("88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b");

    fn receipt(success: bool, logs: Vec<ReceiptLog>) -> TxReceipt {
        TxReceipt {
            transaction_hash: HASH,
            block_number: Some(7),
            success,
            contract_address: None,
            logs,
        }
    }

    fn deployed_log(emitter: Address) -> ReceiptLog {
        ReceiptLog {
            address: emitter,
            topics: vec![
                CollectionFactory::CollectionDeployed::SIGNATURE_HASH,
                COLLECTION.into_word(),
                FACTORY.into_word(),
            ],
            data: Bytes::new(),
        }
    }

    #[test]
    fn test_settle_transitions_once() {
        let confirmed = TransactionRecord::pending(HASH).settle(&receipt(true, vec![]), Some(COLLECTION));
        assert_eq!(confirmed.status, TxStatus::Confirmed);
        assert_eq!(confirmed.result_address, Some(COLLECTION));
        assert_eq!(confirmed.block_number, Some(7));

        let again = confirmed.clone().settle(&receipt(false, vec![]), None);
        assert_eq!(again, confirmed);

        let failed = TransactionRecord::pending(HASH).settle(&receipt(false, vec![]), Some(COLLECTION));
        assert_eq!(failed.status, TxStatus::Failed);
        assert_eq!(failed.result_address, None);
    }

    #[test]
    fn test_factory_address_from_event() {
        assert_eq!(
            deployed_collection(FACTORY, &[deployed_log(FACTORY)]),
            Some(COLLECTION)
        );
    }

    #[test]
    fn test_factory_address_unresolved_without_event() {
        assert_eq!(deployed_collection(FACTORY, &[]), None);
        // Same event from another emitter is not trusted.
        assert_eq!(deployed_collection(FACTORY, &[deployed_log(COLLECTION)]), None);
    }

    #[test]
    fn test_result_address_by_kind() {
        let direct = StepKind::Deploy {
            mode: DeploymentMode::Direct,
            standard: ContractStandard::Erc1155,
        };
        let mut created = receipt(true, vec![]);
        created.contract_address = Some(COLLECTION);
        let request = TxRequest::create(FACTORY, Bytes::new());
        assert_eq!(direct.result_address(&request, &created), Some(COLLECTION));

        let mint = StepKind::Mint { index: 1, total: 1 };
        assert_eq!(mint.result_address(&request, &created), None);
    }

    #[test]
    fn test_classify_invalid_bytecode_for_direct_deploys_only() {
        let direct = StepKind::Deploy {
            mode: DeploymentMode::Direct,
            standard: ContractStandard::Erc721,
        };
        let err = direct.classify(LaunchpadError::Rpc {
            code: -32000,
            message: "invalid bytecode".to_string(),
        });
        assert!(matches!(err, LaunchpadError::InvalidBytecode { .. }));

        let mint = StepKind::Mint { index: 1, total: 2 };
        let err = mint.classify(LaunchpadError::Rpc {
            code: -32000,
            message: "invalid bytecode".to_string(),
        });
        assert!(matches!(err, LaunchpadError::Rpc { .. }));
    }

    #[test]
    fn test_mint_steps_are_numbered() {
        let request = TxRequest::call(FACTORY, COLLECTION, Bytes::new());
        let steps = TxStep::mints(vec![request.clone(), request.clone(), request]);
        assert_eq!(steps[0].kind, StepKind::Mint { index: 1, total: 3 });
        assert_eq!(steps[2].kind.to_string(), "mint 3/3");
    }
}
