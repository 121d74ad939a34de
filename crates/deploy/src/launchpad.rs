//! Deploy and mint flows against a connected wallet.

use std::sync::atomic::{AtomicBool, Ordering};

use alloy_core::primitives::{Address, U256};
use futures::StreamExt;

use crate::{
    ChainId, ContractArtifacts, ContractStandard, DeploymentMode, DeploymentParams,
    FactoryRegistry, LaunchpadError, MintRequest, MintStrategy, SequenceOutcome, Sequencer,
    SequencerConfig, Session, TransactionRecord, TxStep, Wallet, collect_outcome, plan_mint,
};

/// Result of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutcome {
    pub mode: DeploymentMode,
    pub standard: ContractStandard,
    pub chain_id: ChainId,
    pub record: TransactionRecord,
}

/// Runs one deployment or mint at a time through a wallet.
///
/// The session is read from the wallet at the start of every operation, so
/// the deployment mode always reflects the network the wallet is on now.
#[derive(Debug)]
pub struct Launchpad<W> {
    pub(crate) wallet: W,
    pub(crate) registry: FactoryRegistry,
    pub(crate) artifacts: ContractArtifacts,
    pub(crate) sequencer: SequencerConfig,
    pub(crate) mint_strategy: MintStrategy,
    pub(crate) mint_price: U256,
    pub(crate) busy: AtomicBool,
}

/// Holds the busy flag until dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, LaunchpadError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LaunchpadError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<W: Wallet> Launchpad<W> {
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn session(&self) -> Result<Session, LaunchpadError> {
        Session::read(&self.wallet).await
    }

    /// Mode a deployment of `standard` would use on the wallet's current network.
    pub async fn deployment_mode(
        &self,
        standard: ContractStandard,
    ) -> Result<(Session, DeploymentMode), LaunchpadError> {
        let session = self.session().await?;
        Ok((session, self.registry.select_mode(session.chain_id, standard)))
    }

    /// Deploy a collection of `standard`.
    ///
    /// Params are validated before the wallet is contacted at all.
    pub async fn deploy(
        &self,
        standard: ContractStandard,
        params: &DeploymentParams,
    ) -> Result<DeploymentOutcome, LaunchpadError> {
        params.validate(standard)?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        let (session, mode) = self.deployment_mode(standard).await?;
        let plan = self
            .registry
            .assemble(Some(session.chain_id), mode, standard, params)?;
        let request = plan.transaction(session.account, &self.artifacts)?;

        tracing::info!(
            chain_id = %session.chain_id,
            account = %session.account,
            %standard,
            %mode,
            function = plan.function(),
            "Deploying collection"
        );

        let steps = vec![TxStep::deploy(mode, standard, request)];
        let mut records = std::pin::pin!(
            Sequencer::new(&self.wallet, session.chain_id, self.sequencer).execute(steps)
        );

        let record = records
            .next()
            .await
            .ok_or_else(|| LaunchpadError::Network("deployment produced no transaction".to_string()))??;

        if record.result_address.is_none() {
            tracing::warn!(tx_hash = %record.hash, "Collection address unresolved, check the block explorer");
        }

        Ok(DeploymentOutcome {
            mode,
            standard,
            chain_id: session.chain_id,
            record,
        })
    }

    /// Mint from `collection` to the connected account.
    ///
    /// Errors raised before the first submission are returned as `Err`. Once
    /// transactions are being sent, the outcome lists every confirmed one and
    /// the failure that stopped the sequence, if any. Confirmed mints are
    /// never rolled back.
    pub async fn mint(
        &self,
        collection: Address,
        request: &MintRequest,
        on_record: impl FnMut(&TransactionRecord),
    ) -> Result<SequenceOutcome, LaunchpadError> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let session = self.session().await?;
        let requests = plan_mint(
            collection,
            session.account,
            request,
            self.mint_strategy,
            self.mint_price,
        );
        let steps = TxStep::mints(requests);

        tracing::info!(
            chain_id = %session.chain_id,
            %collection,
            standard = %request.standard(),
            strategy = %self.mint_strategy,
            transactions = steps.len(),
            "Minting"
        );

        let records = Sequencer::new(&self.wallet, session.chain_id, self.sequencer).execute(steps);
        let outcome = collect_outcome(records, on_record).await;

        match &outcome.failure {
            None => tracing::info!(confirmed = outcome.confirmed.len(), "Mint complete"),
            Some(err) => tracing::warn!(
                confirmed = outcome.confirmed.len(),
                error = %err,
                "Mint stopped before completion"
            ),
        }

        Ok(outcome)
    }
}
