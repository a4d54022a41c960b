//! voxbot - A realtime voice interview agent worker.
//!
//! Joins rooms assigned by the room server, binds an interview persona to a
//! hosted speech-to-speech model, greets the user, and logs every
//! conversation turn.

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use voxbot::config::{self, Config};
use voxbot::prompt::PromptSource;
use voxbot::worker::Worker;

pub(crate) const VERSION: &str = "0.1.0";

#[derive(Parser)]
#[command(name = "voxbot", about = "voxbot - Voice Interview Agent", version = VERSION)]
struct Cli {
    /// Path to the config file (default: ~/.voxbot/config.json).
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the worker process and wait for job assignments.
    Run,
    /// Resolve and print the interview script for a room.
    Prompt {
        /// Room name to resolve the script for.
        #[arg(short, long)]
        room: String,
    },
    /// Show the effective configuration.
    Status,
}

fn init_tracing() {
    // Always suppress noisy crates regardless of RUST_LOG setting.
    let noisy_crate_filters = ",hyper=warn,reqwest=warn,tungstenite=warn";
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(set) => tracing_subscriber::EnvFilter::new(format!("{set}{noisy_crate_filters}")),
        Err(_) => tracing_subscriber::EnvFilter::new(format!("info{noisy_crate_filters}")),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .ok();
}

fn load_effective_config(path: Option<&std::path::Path>) -> Config {
    let mut cfg = config::load_config(path);
    cfg.apply_env();
    cfg
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment files are read once here, never at module import.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let cfg = load_effective_config(cli.config.as_deref());

    tracing::info!(version = VERSION, "voxbot started");

    match cli.command {
        Commands::Run => {
            let worker = Worker::new(cfg);
            worker.run().await?;
        }
        Commands::Prompt { room } => {
            let source = PromptSource::from_config(&cfg.prompt);
            let script = source.resolve(&room).await?;
            println!("{}", script.instructions());
        }
        Commands::Status => {
            println!("server url:    {}", cfg.worker.server_url);
            println!("agent name:    {}", cfg.worker.agent_name);
            println!("model:         {}", cfg.model.model);
            println!("voice:         {}", cfg.model.voice);
            println!("temperature:   {}", cfg.model.temperature);
            println!(
                "prompt source: {}",
                cfg.prompt.base_url.as_deref().unwrap_or("built-in script")
            );
            println!("noise cancel:  {}", cfg.room.noise_cancellation);
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
