//! mintpad is a CLI tool to deploy and mint NFT collections from your wallet.

mod cli;
mod output;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use futures::StreamExt;
use mintpad_deploy::{
    CONFIG_FILENAME, ChainListClient, ContractStandard, CustomNetwork, DeploymentParams,
    LaunchpadBuilder, LaunchpadConfig, MintRequest, PinningClient, RpcWallet, Session,
    add_network, switch_network, watch_session,
};

use cli::{
    AddNetworkArgs, Cli, Command, ConfigCommand, ConfigOverrides, DeployArgs, MintArgs,
    NetworkCommand,
};

/// Prefix of the environment variables read into the configuration.
const ENV_PREFIX: &str = "MINTPAD_";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    if let Command::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "mintpad", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref(), &cli.overrides)?;

    match cli.command {
        Command::Mode { standard } => {
            let launchpad = LaunchpadBuilder::from_config(&config)?.build();
            let (session, mode) = launchpad.deployment_mode(standard).await?;
            output::print_mode(
                &session,
                standard,
                mode,
                launchpad.registry().lookup(session.chain_id),
            );
        }
        Command::Factories => output::print_factories(&config.registry().entries()),
        Command::Upload { path } => {
            let url = pinning_client(&config)?.upload_file(&path).await?;
            println!("{url}");
        }
        Command::Deploy(args) => deploy(&config, args).await?,
        Command::Mint(args) => mint(&config, args).await?,
        Command::Chains { query } => {
            let chains = chain_list_client(&config)?.search(&query).await?;
            output::print_chains(&chains);
        }
        Command::Network(NetworkCommand::Add(args)) => {
            let wallet = wallet(&config)?;
            let descriptor = match args.from_list {
                Some(chain_id) => chain_list_client(&config)?
                    .fetch()
                    .await?
                    .into_iter()
                    .find(|chain| chain.chain_id == *chain_id)
                    .with_context(|| format!("Chain {} is not in the chain list", chain_id))?
                    .descriptor()?,
                None => custom_network(args).descriptor()?,
            };
            let session = add_network(&wallet, &descriptor).await?;
            output::print_session(&session);
        }
        Command::Network(NetworkCommand::Switch { chain_id }) => {
            let session = switch_network(&wallet(&config)?, chain_id).await?;
            output::print_session(&session);
        }
        Command::Watch { interval_ms } => watch(&config, Duration::from_millis(interval_ms)).await?,
        Command::Config(ConfigCommand::Init { path, force }) => {
            let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists, pass --force to overwrite it",
                    path.display()
                );
            }
            config.save_to_file(&path)?;
        }
        Command::Config(ConfigCommand::Show) => {
            let content = toml::to_string_pretty(&config)
                .context("Failed to serialize launchpad config to TOML")?;
            println!("{content}");
        }
        Command::Completions { .. } => unreachable!("handled before loading the configuration"),
    }

    Ok(())
}

/// The configuration file to read, if any.
///
/// An explicit path wins, then `./Mintpad.toml`, then the user configuration directory.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(if path.is_dir() {
            path.join(CONFIG_FILENAME)
        } else {
            path.to_path_buf()
        });
    }

    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir().map(|dir| dir.join("mintpad").join(CONFIG_FILENAME))
}

/// Layer defaults, the TOML file, `MINTPAD_*` variables and command line flags.
fn load_config(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<LaunchpadConfig> {
    let mut figment = Figment::from(Serialized::defaults(LaunchpadConfig::default()));

    if let Some(path) = config_path(explicit) {
        if explicit.is_some() && !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
        tracing::debug!(path = %path.display(), "Reading configuration file");
        figment = figment.merge(Toml::file(&path));
    }

    let mut config: LaunchpadConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("Failed to load configuration")?;

    overrides.apply(&mut config);
    Ok(config)
}

fn wallet(config: &LaunchpadConfig) -> Result<RpcWallet> {
    Ok(RpcWallet::new(config.wallet_rpc_url.clone(), config.request_timeout())
        .context("Failed to create wallet client")?
        .with_account(config.account))
}

fn pinning_client(config: &LaunchpadConfig) -> Result<PinningClient> {
    Ok(PinningClient::new(config.http_client()?, config.pinning.clone()))
}

fn chain_list_client(config: &LaunchpadConfig) -> Result<ChainListClient> {
    Ok(ChainListClient::new(
        config.http_client()?,
        config.chain_list_url.clone(),
    ))
}

fn custom_network(args: AddNetworkArgs) -> CustomNetwork {
    CustomNetwork {
        chain_id: args.chain_id.unwrap_or_default(),
        chain_name: args.chain_name.unwrap_or_default(),
        rpc_url: args.rpc_url.unwrap_or_default(),
        currency_symbol: args.symbol.unwrap_or_default(),
        block_explorer: args.explorer,
    }
}

async fn deploy(config: &LaunchpadConfig, args: DeployArgs) -> Result<()> {
    let launchpad = LaunchpadBuilder::from_config(config)?.build();

    let mut params = DeploymentParams {
        name: args.name,
        symbol: args.symbol,
        asset_uri: args.asset_uri.unwrap_or_default(),
        max_supply: args.max_supply,
    };

    if let Some(path) = args.asset {
        // The gateway URL is only known after the upload, check the rest first.
        DeploymentParams {
            asset_uri: path.display().to_string(),
            ..params.clone()
        }
        .validate(args.standard)?;

        params.asset_uri = pinning_client(config)?
            .upload_file(&path)
            .await
            .context("Failed to upload collection asset")?
            .to_string();
    }

    let outcome = launchpad.deploy(args.standard, &params).await?;
    output::print_deployment(&outcome);
    Ok(())
}

async fn mint(config: &LaunchpadConfig, args: MintArgs) -> Result<()> {
    let mut builder = LaunchpadBuilder::from_config(config)?;
    if let Some(strategy) = args.strategy {
        builder = builder.mint_strategy(strategy);
    }
    let launchpad = builder.build();

    let request = match args.standard {
        ContractStandard::Erc721 => MintRequest::erc721(&args.quantity)?,
        ContractStandard::Erc1155 => MintRequest::erc1155(&args.token_id, &args.amount)?,
    };

    let outcome = launchpad
        .mint(args.collection, &request, output::print_record)
        .await?;
    output::print_mint_summary(&outcome);

    match outcome.failure {
        None => Ok(()),
        Some(err) => Err(err).context(format!(
            "Mint stopped after {} confirmed transaction(s)",
            outcome.confirmed.len()
        )),
    }
}

async fn watch(config: &LaunchpadConfig, interval: Duration) -> Result<()> {
    let wallet = wallet(config)?;
    let session = Session::read(&wallet).await?;
    output::print_session(&session);

    let mut events = std::pin::pin!(watch_session(&wallet, session, interval));

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(event) => output::print_event(&event?),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    Ok(())
}
