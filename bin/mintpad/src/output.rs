//! Terminal rendering of command results.

use alloy_core::primitives::Address;
use comfy_table::{Table, presets::UTF8_FULL};
use mintpad_deploy::{
    ChainInfo, ContractStandard, DeploymentMode, DeploymentOutcome, FactoryEntry, SequenceOutcome,
    Session, SessionEvent, TransactionRecord,
};

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn or_unresolved(address: Option<Address>) -> String {
    address
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unresolved, check the block explorer".to_string())
}

pub fn print_session(session: &Session) {
    println!("account  {}", session.account);
    println!("chain    {}", session.chain_id);
}

pub fn print_mode(
    session: &Session,
    standard: ContractStandard,
    mode: DeploymentMode,
    factory: Option<Address>,
) {
    print_session(session);
    println!("standard {}", standard);
    match (mode, factory) {
        (DeploymentMode::Factory, Some(factory)) => println!("mode     {} ({})", mode, factory),
        _ => println!("mode     {}", mode),
    }
}

pub fn print_factories(entries: &[FactoryEntry]) {
    let mut table = table(vec!["Chain ID", "Factory"]);
    for entry in entries {
        table.add_row(vec![entry.chain_id.to_string(), entry.address.to_string()]);
    }
    println!("{table}");
}

pub fn print_record(record: &TransactionRecord) {
    println!(
        "{} {} (block {})",
        record.status,
        record.hash,
        record
            .block_number
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
}

pub fn print_deployment(outcome: &DeploymentOutcome) {
    let mut table = table(vec!["Field", "Value"]);
    table
        .add_row(vec!["Standard".to_string(), outcome.standard.to_string()])
        .add_row(vec!["Mode".to_string(), outcome.mode.to_string()])
        .add_row(vec!["Chain".to_string(), outcome.chain_id.to_string()])
        .add_row(vec!["Transaction".to_string(), outcome.record.hash.to_string()])
        .add_row(vec!["Status".to_string(), outcome.record.status.to_string()])
        .add_row(vec![
            "Collection".to_string(),
            or_unresolved(outcome.record.result_address),
        ]);
    println!("{table}");
}

pub fn print_mint_summary(outcome: &SequenceOutcome) {
    match &outcome.failure {
        None => println!("minted: {} transaction(s) confirmed", outcome.confirmed.len()),
        // Confirmed mints stay minted.
        Some(err) => println!(
            "stopped after {} confirmed transaction(s): {}",
            outcome.confirmed.len(),
            err
        ),
    }
}

pub fn print_chains(chains: &[ChainInfo]) {
    if chains.is_empty() {
        println!("no matching chain");
        return;
    }

    let mut table = table(vec!["Chain ID", "Name", "Currency", "RPC"]);
    for chain in chains {
        table.add_row(vec![
            chain.chain_id.to_string(),
            chain.name.clone(),
            chain.native_currency.symbol.clone(),
            chain
                .rpc
                .iter()
                .find(|url| !url.contains("${"))
                .cloned()
                .unwrap_or_default(),
        ]);
    }
    println!("{table}");
}

pub fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::AccountChanged { from, to } => println!("account changed {} -> {}", from, to),
        SessionEvent::ChainChanged { from, to } => {
            println!("chain changed {} -> {}, deployment mode must be re-derived", from, to)
        }
    }
}
