use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use warden_config::{load_config, load_destinations};
use warden_control::{run_tick, EventSource, MemoryHost, ScriptedSession};
use warden_core::{Dispatcher, NotifyKind, TaskKind};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "warden_cli", about = "Warden scenario runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted scenario for a fixed number of ticks, as fast as possible.
    Run {
        #[arg(long)]
        ticks: u64,
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long, default_value = "./content")]
        config_dir: PathBuf,
        /// Version string the emulated host reports, e.g. "1.20.4".
        #[arg(long, default_value = "1.20.4")]
        platform_version: String,
        #[arg(long, default_value_t = 20)]
        print_every: u64,
        /// Write the final per-entity summary as JSON.
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },
    /// Load and validate the configuration directory without running anything.
    Validate {
        #[arg(long, default_value = "./content")]
        config_dir: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(
    ticks: u64,
    scenario: &Path,
    config_dir: &Path,
    platform_version: &str,
    print_every: u64,
    summary_json: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_dir)?;
    let destinations = load_destinations(config_dir)?;
    let json = std::fs::read_to_string(scenario)
        .with_context(|| format!("reading scenario file: {}", scenario.display()))?;
    let mut session = ScriptedSession::from_json(&json)
        .with_context(|| format!("parsing scenario file: {}", scenario.display()))?;

    let mut dispatcher =
        Dispatcher::initialize(platform_version, config, MemoryHost::new(), destinations)
            .context("initializing dispatcher")?;

    println!(
        "Starting scenario: ticks={ticks} steps={} tier={:?} equipment={:?} destinations={}",
        session.len(),
        dispatcher.tier(),
        dispatcher.bundle().equipment,
        dispatcher.destinations().len(),
    );
    println!("{}", "-".repeat(80));

    let mut cancelled = 0usize;
    let mut rejected = 0usize;
    let mut faults = 0usize;
    for _ in 0..ticks {
        let report = run_tick(&mut dispatcher, &mut session);
        cancelled += report.cancelled;
        rejected += report.rejected;
        for fault in &report.faults {
            println!("*** TASK FAULT at tick={:04}: {fault} ***", report.tick);
        }
        faults += report.faults.len();

        if print_every > 0 && dispatcher.current_tick() % print_every == 0 {
            print_status(&dispatcher);
        }
    }
    if !session.is_exhausted() {
        println!(
            "Note: scenario has steps up to tick {} that were not reached.",
            session.last_tick().unwrap_or_default()
        );
    }

    println!("{}", "-".repeat(80));
    println!(
        "Done at tick {}: cancelled_events={cancelled} rejected_commands={rejected} faults={faults}",
        dispatcher.current_tick()
    );
    print_summary(dispatcher.host());

    if let Some(path) = summary_json {
        write_summary(path, dispatcher.host())?;
        println!("Summary written to {}", path.display());
    }

    dispatcher.shutdown();
    Ok(())
}

fn print_status(dispatcher: &Dispatcher<MemoryHost>) {
    let host = dispatcher.host();
    println!(
        "[tick={tick:04}]  online={online}  equipment_tasks={equipment}  \
         roster_tasks={roster}  frozen={frozen}  notices={notices}",
        tick = dispatcher.current_tick(),
        online = warden_core::Host::online(host).len(),
        equipment = dispatcher.active_tasks(TaskKind::EquipmentEffect),
        roster = dispatcher.active_tasks(TaskKind::RosterHide),
        frozen = dispatcher.freeze().len(),
        notices = host.notifications().len(),
    );
}

fn print_summary(host: &MemoryHost) {
    println!(
        "notifications: info={} warning={} feedback={}",
        host.count_notifications(NotifyKind::Info),
        host.count_notifications(NotifyKind::Warning),
        host.count_notifications(NotifyKind::FeedbackTick),
    );
    for (id, record) in host.records() {
        println!(
            "  {name:<16} {id}  health={health:5.1}  damage={damage:5.1} ({hits} hits)  \
             teleports={teleports}  hidden={hidden}",
            name = record.name,
            health = record.health,
            damage = record.damage_taken,
            hits = record.hits,
            teleports = record.teleports,
            hidden = record.roster_hidden,
        );
    }
}

fn write_summary(path: &Path, host: &MemoryHost) -> Result<()> {
    let entities: Vec<serde_json::Value> = host
        .records()
        .map(|(id, record)| {
            serde_json::json!({
                "id": id,
                "name": record.name,
                "health": record.health,
                "damage_taken": record.damage_taken,
                "hits": record.hits,
                "teleports": record.teleports,
                "roster_hidden": record.roster_hidden,
                "position": record.position,
            })
        })
        .collect();
    let summary = serde_json::json!({
        "entities": entities,
        "notifications": host.notifications(),
    });
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &summary)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            scenario,
            config_dir,
            platform_version,
            print_every,
            summary_json,
        } => run(
            ticks,
            &scenario,
            &config_dir,
            &platform_version,
            print_every,
            summary_json.as_deref(),
        )?,
        Commands::Validate { config_dir } => {
            let config = load_config(&config_dir)?;
            let destinations = load_destinations(&config_dir)?;
            tracing::info!(dir = %config_dir.display(), "configuration is valid");
            println!(
                "OK: {} destinations, equipment effect {}, countdown {} ticks",
                destinations.len(),
                if config.equipment_effect_enabled { "on" } else { "off" },
                config.countdown_duration_ticks,
            );
        }
    }
    Ok(())
}
