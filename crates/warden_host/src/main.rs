mod release;
mod state;
mod tick_loop;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use warden_config::{load_destinations, load_or_init_config, save_destinations};
use warden_control::{MemoryHost, ScriptedSession};
use warden_core::Dispatcher;

use crate::release::spawn_release_check;
use crate::state::DaemonState;
use crate::tick_loop::{run_tick_loop, LoopExit};

#[derive(Parser)]
#[command(name = "warden_host", about = "Warden real-time host daemon")]
struct Cli {
    #[arg(long, default_value = "./content")]
    config_dir: PathBuf,
    /// Scripted inputs to replay in real time.
    #[arg(long)]
    scenario: PathBuf,
    /// Version string the emulated platform reports, e.g. "1.20.4".
    #[arg(long)]
    platform_version: String,
    /// Ticks per second. 0 = as fast as possible.
    #[arg(long, default_value_t = 20.0)]
    ticks_per_sec: f64,
    /// Stop after this many ticks. Runs until Ctrl-C when omitted.
    #[arg(long)]
    max_ticks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = load_or_init_config(&cli.config_dir)?;
    let destinations = load_destinations(&cli.config_dir)?;
    let json = std::fs::read_to_string(&cli.scenario)
        .with_context(|| format!("reading scenario file: {}", cli.scenario.display()))?;
    let session = ScriptedSession::from_json(&json)
        .with_context(|| format!("parsing scenario file: {}", cli.scenario.display()))?;

    let release = config
        .release_check_url
        .clone()
        .map(|url| spawn_release_check(url, env!("CARGO_PKG_VERSION").to_string()));

    let dispatcher = Dispatcher::initialize(
        &cli.platform_version,
        config,
        MemoryHost::new(),
        destinations,
    )
    .context("initializing dispatcher")?;
    tracing::info!(
        tier = ?dispatcher.tier(),
        steps = session.len(),
        ticks_per_sec = cli.ticks_per_sec,
        "warden_host starting"
    );

    let mut state = DaemonState::new(dispatcher, session, release);
    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let exit = run_tick_loop(&mut state, cli.ticks_per_sec, cli.max_ticks, shutdown).await;

    state.dispatcher.shutdown();
    save_destinations(&cli.config_dir, state.dispatcher.destinations())?;
    tracing::info!(
        ?exit,
        tick = state.current_tick(),
        faults = state.faults,
        interrupted = exit == LoopExit::Interrupted,
        "warden_host stopped"
    );
    Ok(())
}
