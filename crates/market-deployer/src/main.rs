use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use alloy::primitives::{Address, B256};
use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument};

use market_deployer::catalog::IrmPresets;
use market_deployer::chain::{locate_deployment, read_snapshot, ChainReader, RpcChainReader};
use market_deployer::compiler;
use market_deployer::config::{self, DeployerConfig};
use market_deployer::constants::SILO_FACTORY;
use market_deployer::logging;
use market_deployer::types::MarketConfiguration;
use market_deployer::verify::{CheckEvent, VerificationContext, VerificationEngine};

const USAGE: &str = "usage:
  market-deployer compile <market.json>
  market-deployer verify <siloConfig | --tx <hash>> [market.json]";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    };

    let config_dir = std::env::var("DEPLOYER_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));
    let config = config::load_config(&config_dir)?;

    // Hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        chain_id = config.chain.chain_id,
        chain = %config.chain.alias,
        command = %command,
        "market deployer starting"
    );

    let span = logging::command_span(command, &config.chain.alias);
    match command.as_str() {
        "compile" => match args.get(1) {
            Some(path) => span.in_scope(|| run_compile(&config, Path::new(path))),
            None => {
                eprintln!("{USAGE}");
                Ok(ExitCode::from(2))
            }
        },
        "verify" => run_verify(&config, &args[1..]).instrument(span).await,
        other => {
            eprintln!("unknown command '{other}'\n{USAGE}");
            Ok(ExitCode::from(2))
        }
    }
}

// ---------------------------------------------------------------------------
// compile
// ---------------------------------------------------------------------------

fn run_compile(config: &DeployerConfig, market_path: &Path) -> Result<ExitCode> {
    let market = load_market(market_path, &config.irm_presets)?;
    let contracts = config.address_book()?;
    let oracles = config.oracle_catalog(&contracts);

    let compiled = compiler::compile(&market, &contracts, &oracles)
        .with_context(|| format!("failed to compile {}", market_path.display()))?;

    println!("{}", compiled.calldata());

    if compiled.is_ready() {
        info!(deployer = %compiled.deployer, "deploy calldata ready to submit");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(
            warnings = compiled.warnings.len(),
            "deploy calldata has unresolved addresses; do not submit"
        );
        Ok(ExitCode::FAILURE)
    }
}

/// Read a wizard export, substituting IRM preset names first.
fn load_market(path: &Path, presets: &IrmPresets) -> Result<MarketConfiguration> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read market file: {}", path.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse market file: {}", path.display()))?;
    presets.expand(&mut value)?;
    serde_json::from_value(value)
        .with_context(|| format!("invalid market configuration: {}", path.display()))
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

async fn run_verify(config: &DeployerConfig, args: &[String]) -> Result<ExitCode> {
    let (target, market_path) = match args {
        [flag, hash, rest @ ..] if flag == "--tx" => (Target::Tx(parse_tx_hash(hash)?), rest.first()),
        [address, rest @ ..] => (Target::SiloConfig(parse_address(address)?), rest.first()),
        [] => {
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    let reader: Arc<dyn ChainReader> = Arc::new(RpcChainReader::connect_http(&config.chain.rpc.http_url)?);
    let contracts = config.address_book()?;
    let oracles = config.oracle_catalog(&contracts);

    let silo_config = match target {
        Target::SiloConfig(address) => address,
        Target::Tx(hash) => {
            let market = locate_deployment(reader.as_ref(), hash).await?;
            match contracts.get(SILO_FACTORY) {
                Some(factory) if factory != market.factory => warn!(
                    emitter = %market.factory,
                    factory = %factory,
                    "NewSilo was not emitted by the canonical SiloFactory"
                ),
                Some(_) => {}
                None => warn!("SiloFactory not in the address book, event emitter unchecked"),
            }
            market.silo_config
        }
    };

    let snapshot = read_snapshot(reader.as_ref(), silo_config)
        .await
        .with_context(|| format!("failed to read market {silo_config}"))?;

    let mut ctx = VerificationContext::new(snapshot, Arc::clone(&reader))
        .with_chain_id(config.chain.chain_id)
        .with_reference(config.chain.reference.clone())
        .with_bounds(config.verification.clone())
        .with_oracles(oracles)
        .with_contracts(contracts);
    if let Some(path) = market_path {
        ctx = ctx.with_expected(load_market(Path::new(path), &config.irm_presets)?);
    }

    let (tx, mut rx) = mpsc::channel::<CheckEvent>(64);
    let follower = tokio::spawn(
        async move {
            while let Some(event) = rx.recv().await {
                match event {
                    CheckEvent::Pending { id } => debug!(check = %id, "pending"),
                    CheckEvent::Running { id } => debug!(check = %id, "running"),
                    CheckEvent::Finished(result) => debug!(
                        check = %result.info.id,
                        status = ?result.status(),
                        "finished"
                    ),
                }
            }
        }
        .in_current_span(),
    );

    let report = VerificationEngine::default().run(Arc::new(ctx), Some(tx)).await;
    if let Err(e) = follower.await {
        warn!(error = %e, "progress follower exited abnormally");
    }

    report.log_summary();
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

enum Target {
    SiloConfig(Address),
    Tx(B256),
}

fn parse_address(s: &str) -> Result<Address> {
    s.parse().with_context(|| format!("invalid siloConfig address '{s}'"))
}

fn parse_tx_hash(s: &str) -> Result<B256> {
    if s.trim_start_matches("0x").len() != 64 {
        bail!("invalid transaction hash '{s}'");
    }
    s.parse().with_context(|| format!("invalid transaction hash '{s}'"))
}
