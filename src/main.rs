mod app;
mod components;
mod config;
mod data;
mod error;
mod events;
mod theme;
mod utils;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use alloy::primitives::B256;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::{Command, Config};
use crate::data::DataService;
use crate::data::chains::ChainRegistry;
use crate::data::explorer::ExplorerClient;
use crate::data::export;
use crate::data::labels::{ArkhamLabeler, EntityLabeler, NoLabels};
use crate::data::provider::RpcConnector;
use crate::data::report::{ActivityReport, TxRecord};
use crate::data::resolver::{Resolver, parse_tx_hash};
use crate::data::types::ResolutionResult;
use crate::error::ResolveError;

const ENV_FILE: &str = "variables.env";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    load_env_files(None);
    let mut config = Config::parse();
    if let Some(path) = config.env_file.clone() {
        load_env_files(Some(path));
        // Re-read so env fallbacks see the extra file.
        config = Config::parse();
    }

    init_tracing(config.command.is_none())?;

    let registry = Arc::new(ChainRegistry::from_env());
    for chain in registry.iter().filter(|c| c.rpc_url.is_none()) {
        tracing::warn!(chain = %chain.name, "no RPC URL configured");
    }
    let resolver = build_resolver(&config, Arc::clone(&registry));

    match config.command.clone() {
        Some(command) => match run_command(&config, &resolver, command).await {
            Ok(()) => Ok(()),
            Err(e) => match e.downcast_ref::<ResolveError>() {
                Some(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
                None => Err(e),
            },
        },
        None => run_tui(config, resolver).await,
    }
}

/// Load `variables.env` from the working directory and the config dir, plus
/// an explicit file when given. Variables already set are not overridden.
fn load_env_files(explicit: Option<PathBuf>) {
    match explicit {
        Some(path) => {
            if let Err(e) = dotenvy::from_path(&path) {
                eprintln!("Could not load {}: {e}", path.display());
            }
        }
        None => {
            dotenvy::from_filename(ENV_FILE).ok();
            if let Some(dir) = dirs::config_dir() {
                dotenvy::from_path(dir.join("tx-tracker").join(ENV_FILE)).ok();
            }
        }
    }
}

fn init_tracing(tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tui {
        // The terminal belongs to the UI, so logs go to a file.
        let dir = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("tx-tracker.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .wrap_err_with(|| format!("opening log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn build_resolver(config: &Config, registry: Arc<ChainRegistry>) -> Resolver {
    let arkham = ArkhamLabeler::new(
        config.arkham_api_key.clone(),
        config.arkham_base.clone(),
        config.explorer_timeout(),
    );
    let labeler: Arc<dyn EntityLabeler> = if arkham.is_enabled() {
        Arc::new(arkham)
    } else {
        tracing::info!("ARKHAM_API_KEY not set, entity labels disabled");
        Arc::new(NoLabels)
    };

    Resolver::new(
        registry,
        Arc::new(RpcConnector::new(config.rpc_timeout())),
        Arc::new(ExplorerClient::new(config.explorer_timeout())),
        labeler,
        config.scan_settings(),
    )
}

async fn run_command(config: &Config, resolver: &Resolver, command: Command) -> Result<()> {
    let chain = config.chain_hint();

    match command {
        Command::Lookup { hash } => {
            let detail = resolver.lookup(&hash, chain).await?;
            for line in TxRecord::from_detail(&detail).lines() {
                println!("{line}");
            }
        }
        Command::Activity { hash, json } => {
            let result = resolver.resolve(&hash, chain).await?;
            if json {
                let report = ActivityReport::from_result(&result);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_activity(resolver, &result);
            }
        }
        Command::Export { hash, out } => {
            let parsed: B256 = parse_tx_hash(&hash)?;
            let detail = resolver.lookup(&hash, chain).await?;
            let path = out.unwrap_or_else(|| PathBuf::from(export::default_pdf_name(&parsed)));
            let message = export::export_tx_pdf(&TxRecord::from_detail(&detail), &path)?;
            println!("{message}");
        }
        Command::Chains { probe } => {
            println!(
                "{:<22} {:>10}  {:<5}  {}",
                "CHAIN", "CHAIN ID", "RPC", "EXPLORER KEY"
            );
            for chain in resolver.registry().iter() {
                let rpc = if chain.rpc_url.is_none() {
                    "no"
                } else if !probe {
                    "yes"
                } else if resolver.probe(chain).await {
                    "up"
                } else {
                    "down"
                };
                let key = match chain.explorer.api_key {
                    Some(_) => "yes".to_string(),
                    None => format!("no (set {})", chain.explorer.api_key_env),
                };
                println!("{:<22} {:>10}  {:<5}  {}", chain.name, chain.chain_id, rpc, key);
            }
        }
    }
    Ok(())
}

fn print_activity(resolver: &Resolver, result: &ResolutionResult) {
    let symbol = resolver
        .registry()
        .get(&result.chain_name)
        .map(|c| c.symbol.as_str())
        .unwrap_or("ETH");

    println!(
        "Wallet {} on {} ({})",
        result.wallet.to_checksum(None),
        result.chain_name,
        result.source_of_truth
    );
    println!(
        "{:>10}  {:<19}  {:<66}  {:>24}  {}",
        "BLOCK", "TIME (UTC)", "HASH", "VALUE", "TYPE"
    );
    for tx in &result.transactions {
        println!(
            "{:>10}  {:<19}  {:<66}  {:>24}  {}",
            tx.block_number.map(|n| n.to_string()).unwrap_or_default(),
            tx.block_timestamp
                .and_then(utils::format_minute)
                .unwrap_or_else(|| "-".to_string()),
            format!("{:#x}", tx.hash),
            utils::format_native(tx.value, symbol),
            tx.annotation(),
        );
    }
    println!(
        "{} transactions, total {}",
        result.transactions.len(),
        utils::format_native(result.total_value, symbol)
    );
}

async fn run_tui(config: Config, resolver: Resolver) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let data_service = Arc::new(DataService::new(
        resolver,
        config.export_dir.clone(),
        event_tx,
    ));

    let chain_hint = config.chain_hint().map(str::to_string);
    let mut app = App::with_service(data_service, event_rx, config.tick_rate_ms, chain_hint.clone());

    if let Some(query) = &config.search {
        app.submit_search(query, chain_hint.as_deref());
    }

    let terminal = ratatui::init();
    let result = app.run(terminal).await;
    ratatui::restore();

    result
}
