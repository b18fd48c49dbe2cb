mod config;
mod sim;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_core::Outcome;
use clap::{Parser, Subcommand};
use events::{BattleEvent, EventBus};
use orchestrator::{BattleOrchestrator, BusNotifier};
use tokio::sync::broadcast::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{SimConfig, DEFAULT_CONFIG_FILE};
use crate::sim::{KnockoutEvaluator, Roster, SpeedOrder, TurnLogger};

#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Run a turn-based battle from a TOML roster", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample battle config
    Init {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Run the battle described by the config
    Run {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Override `orchestrator.max_turns`
        #[arg(long)]
        max_turns: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { config }) => init_config(&config).await,
        Some(Commands::Run { config, max_turns }) => run(&config, max_turns).await,
        None => run(Path::new(DEFAULT_CONFIG_FILE), None).await,
    }
}

async fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    let content = SimConfig::default().to_toml()?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote sample battle config to {}", path.display());
    println!("Run 'battle-sim run --config {}' to start", path.display());
    Ok(())
}

async fn run(path: &Path, max_turns: Option<u32>) -> Result<()> {
    let (mut config, found) = SimConfig::load(path).await?;
    if !found {
        println!("No config found at {}.", path.display());
        println!("Run 'battle-sim init' first, or using the default roster.");
        println!();
    }
    if let Some(max) = max_turns {
        config.orchestrator.max_turns = Some(max);
    }

    init_tracing();

    let bus = EventBus::new();
    let orchestrator: BattleOrchestrator<Roster> = BattleOrchestrator::new(
        SpeedOrder::new(&config),
        KnockoutEvaluator,
        BusNotifier::wrapping(bus.clone(), TurnLogger),
    )
    .with_config(config.orchestrator.clone())
    .with_event_bus(bus.clone());

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received, fleeing the battle");
                shutdown.cancel();
            }
        });
    }

    let mut rx = bus.subscribe();
    let roster = Arc::new(Roster::new(&config.battlers));
    let outcome = orchestrator
        .start_battle(Arc::clone(&roster), Some(&shutdown))
        .await
        .context("Battle failed")?;

    let mut turns = 0;
    loop {
        match rx.try_recv() {
            Ok(envelope) => {
                if let BattleEvent::SessionEnded { turns: n, .. } = envelope.event {
                    turns = n;
                }
            }
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    println!();
    match &outcome {
        Outcome::Decided { result, payload } => {
            println!("Outcome: {:?} after {} turn(s)", result, turns);
            if let Some(payload) = payload {
                println!("Details: {}", payload);
            }
        }
        Outcome::Aborted => println!("Outcome: Aborted after {} turn(s)", turns),
    }
    println!("Roster:  {}", roster.summary());

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "battle_sim=info,orchestrator=info".into()),
        )
        .init();
}
