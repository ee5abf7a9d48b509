use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use chime_core::config::StoreBackend;
use chime_core::{ChimeConfig, Frequency, JobStore, Notifier, RuleSpec};
use chime_notify::{DesktopNotifier, LogNotifier};
use chime_scheduler::{Engine, SimulatedWork};
use chime_store::{JsonStore, SqliteStore};

#[derive(Parser)]
#[command(name = "chime", about = "Scheduler & alarms CLI", version)]
struct Cli {
    /// Config file (defaults to ~/.chime/chime.toml; CHIME_CONFIG also works)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a new scheduled job
    Add {
        #[arg(long)]
        name: String,
        /// once | hourly | daily | weekly | interval
        #[arg(long, default_value = "once")]
        freq: String,
        /// HH:MM (today, UTC) or a full date-time; for non-interval rules
        #[arg(long)]
        time: Option<String>,
        /// Repeat period in seconds; for interval rules
        #[arg(long)]
        seconds: Option<i64>,
        /// Opaque description of what to run
        #[arg(long, default_value = "echo task")]
        command: String,
    },
    /// List jobs and their next run times
    List,
    /// Run the scheduler until interrupted
    Start,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chime=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.or_else(|| std::env::var("CHIME_CONFIG").ok());
    let config = ChimeConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({e}), using defaults");
        ChimeConfig::default()
    });

    let store = build_store(&config)?;
    let notifier = build_notifier(&config);
    let mut engine = Engine::new(store, notifier)?
        .with_poll_interval(Duration::from_secs(config.scheduler.poll_interval_secs))
        .with_work(Arc::new(SimulatedWork::new(Duration::from_secs(
            config.scheduler.work_secs,
        ))));

    match cli.command {
        Command::Add {
            name,
            freq,
            time,
            seconds,
            command,
        } => {
            let frequency: Frequency = freq.parse()?;
            let spec = RuleSpec {
                frequency,
                time,
                seconds,
            };
            let job = engine.add_job(&name, &command, &spec)?;
            println!(
                "Job added successfully. Next run: {}",
                job.next_run.to_rfc3339()
            );
        }

        Command::List => {
            for job in engine.list_jobs() {
                let state = if job.done { " (done)" } else { "" };
                println!(
                    "- {} | next run: {}{state}",
                    job.name,
                    job.next_run.to_rfc3339()
                );
            }
        }

        Command::Start => {
            engine.start();
            info!("scheduler running; press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            engine.stop().await;
        }
    }

    Ok(())
}

fn build_store(config: &ChimeConfig) -> anyhow::Result<Arc<dyn JobStore>> {
    Ok(match config.store.backend {
        StoreBackend::Json => Arc::new(JsonStore::new(&config.store.path)),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.store.path)?),
    })
}

fn build_notifier(config: &ChimeConfig) -> Arc<dyn Notifier> {
    if config.notifications.desktop {
        Arc::new(DesktopNotifier::new(config.notifications.sound))
    } else {
        Arc::new(LogNotifier)
    }
}
