//! mintpad-deploy - NFT collection launchpad library for EVM chains.
//!
//! This crate picks how a collection is deployed (through a pre-deployed
//! factory or by direct bytecode deployment), assembles the calls, and runs
//! them one after the other through a connected wallet. It also uploads
//! collection assets to an IPFS pinning service and helps the wallet join
//! custom networks.

mod chain;
pub use chain::{ChainId, FactoryEntry, FactoryRegistry, lookup_factory};

mod mode;
pub use mode::{ContractStandard, DeploymentMode, select_mode};

mod error;
pub use error::{BYTECODE_HINT, LaunchpadError, USER_REJECTED_CODE};

pub mod contracts;
pub use contracts::{ArtifactPaths, ContractArtifacts};

mod plan;
pub use plan::{
    CallPlan, CollectionArgs, ConstructorArgs, DeploymentParams, MAX_MINT_QUANTITY, MintRequest,
    MintStrategy, assemble, plan_mint,
};

pub mod rpc;

mod wallet;
pub use wallet::{
    DEFAULT_WALLET_RPC_URL, ReceiptLog, RpcWallet, Session, SessionEvent, TxReceipt, TxRequest,
    Wallet, watch_session,
};

mod sequencer;
pub use sequencer::{
    SequenceOutcome, Sequencer, SequencerConfig, StepKind, TransactionRecord, TxStatus, TxStep,
    collect_outcome,
};

mod upload;
pub use upload::{
    DEFAULT_GATEWAY, DEFAULT_PINNING_ENDPOINT, PinningClient, PinningConfig, gateway_url,
};

pub mod chainlist;
pub use chainlist::{ChainInfo, ChainListClient, search_chains};

pub mod network;
pub use network::{
    ChainDescriptor, CustomNetwork, NativeCurrency, add_network, switch_network,
};

mod launchpad;
pub use launchpad::{DeploymentOutcome, Launchpad};

mod builder;
pub use builder::LaunchpadBuilder;

mod config;
pub use config::{CONFIG_FILENAME, LaunchpadConfig};

#[cfg(test)]
mod testing;
