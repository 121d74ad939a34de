use std::path::PathBuf;

use alloy_core::primitives::Address;
use clap::{Args, Parser, Subcommand};
use mintpad_deploy::{ChainId, ContractStandard, LaunchpadConfig, MintStrategy};
use tracing::level_filters::LevelFilter;
use url::Url;

/// Parse a contract standard given as `erc721`, `erc-1155`, `ERC721`...
fn parse_standard(value: &str) -> Result<ContractStandard, String> {
    value
        .parse()
        .map_err(|_| format!("unknown standard '{}', expected erc721 or erc1155", value))
}

#[derive(Parser)]
#[command(name = "mintpad")]
#[command(
    author,
    version,
    about = "Deploy and mint NFT collections on EVM chains from your wallet"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, global = true, env = "MINTPAD_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Mintpad.toml configuration file, or to the directory holding it.
    ///
    /// If not provided, ./Mintpad.toml is used when present, then the file in
    /// the user configuration directory.
    #[arg(long, alias = "conf", global = true, env = "MINTPAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Settings overriding the configuration file.
    #[clap(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Command line overrides, applied on top of the file and environment.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// The JSON-RPC endpoint of the wallet.
    #[arg(long, alias = "wallet", global = true)]
    pub wallet_rpc_url: Option<Url>,

    /// Send from this account instead of the wallet's first one.
    #[arg(long, global = true)]
    pub account: Option<Address>,

    /// Stop waiting for a receipt after this many seconds.
    #[arg(long, global = true)]
    pub receipt_timeout: Option<u64>,

    /// Delay between receipt polls, in milliseconds.
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut LaunchpadConfig) {
        if let Some(url) = &self.wallet_rpc_url {
            config.wallet_rpc_url = url.clone();
        }
        if let Some(account) = self.account {
            config.account = Some(account);
        }
        if let Some(secs) = self.receipt_timeout {
            config.receipt_timeout_secs = Some(secs);
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the deployment mode for the wallet's current network.
    Mode {
        #[arg(short, long, value_parser = parse_standard, default_value = "erc721")]
        standard: ContractStandard,
    },

    /// List the chains with a registered factory.
    Factories,

    /// Upload a file to the pinning service and print its gateway URL.
    Upload {
        /// The file to upload.
        path: PathBuf,
    },

    /// Deploy a new collection.
    Deploy(DeployArgs),

    /// Mint from a deployed collection to the connected account.
    Mint(MintArgs),

    /// Search the public chain list by name or chain id.
    Chains {
        /// Part of a chain name or id.
        query: String,
    },

    /// Add or switch wallet networks.
    #[command(subcommand)]
    Network(NetworkCommand),

    /// Print account and network changes until interrupted.
    Watch {
        /// Polling interval in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },

    /// Manage the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    #[arg(short, long, value_parser = parse_standard, default_value = "erc721")]
    pub standard: ContractStandard,

    /// The collection name.
    #[arg(long)]
    pub name: String,

    /// The collection symbol (ERC721 only).
    #[arg(long, default_value = "")]
    pub symbol: String,

    /// Base token URI, usually a gateway URL from `mintpad upload`.
    #[arg(long, conflicts_with = "asset", required_unless_present = "asset")]
    pub asset_uri: Option<String>,

    /// Upload this file first and use its gateway URL as the asset URI.
    #[arg(long)]
    pub asset: Option<PathBuf>,

    /// Maximum supply (ERC721 only).
    #[arg(long, default_value = "10000")]
    pub max_supply: String,
}

#[derive(Debug, Args)]
pub struct MintArgs {
    /// Address of the deployed collection.
    #[arg(long)]
    pub collection: Address,

    #[arg(short, long, value_parser = parse_standard, default_value = "erc721")]
    pub standard: ContractStandard,

    /// Number of tokens to mint (ERC721).
    #[arg(short, long, default_value = "1")]
    pub quantity: String,

    /// Token id to mint (ERC1155).
    #[arg(long, default_value = "1")]
    pub token_id: String,

    /// Amount of the token to mint (ERC1155).
    #[arg(long, default_value = "1")]
    pub amount: String,

    /// How to split an ERC721 mint of several tokens into transactions.
    #[arg(long)]
    pub strategy: Option<MintStrategy>,
}

#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// Ask the wallet to add a network.
    ///
    /// Either describe the network by hand, or pass --from-list to take its
    /// details from the public chain list.
    Add(AddNetworkArgs),

    /// Ask the wallet to switch to a network it already knows.
    Switch {
        /// Decimal or 0x-prefixed chain id.
        chain_id: ChainId,
    },
}

#[derive(Debug, Args)]
pub struct AddNetworkArgs {
    /// Look the chain up by id in the public chain list.
    #[arg(long, conflicts_with_all = ["chain_id", "chain_name", "rpc_url", "symbol", "explorer"])]
    pub from_list: Option<ChainId>,

    /// Decimal or 0x-prefixed chain id.
    #[arg(long, required_unless_present = "from_list")]
    pub chain_id: Option<String>,

    #[arg(long, required_unless_present = "from_list")]
    pub chain_name: Option<String>,

    #[arg(long, required_unless_present = "from_list")]
    pub rpc_url: Option<String>,

    /// Native currency symbol.
    #[arg(long, required_unless_present = "from_list")]
    pub symbol: Option<String>,

    /// Block explorer URL.
    #[arg(long)]
    pub explorer: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write the effective configuration to a file.
    Init {
        /// Destination, defaults to ./Mintpad.toml.
        path: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration.
    Show,
}
