use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use connect_four_engine::config::{AppConfig, LogConfig};
use connect_four_engine::game::GameEngine;
use connect_four_engine::script::{self, OutputFormat, Replay};

/// Replay a Connect Four command script and print engine events.
#[derive(Parser)]
#[command(name = "connect-four", about = "Replay a Connect Four command script")]
struct Cli {
    /// Command script to replay (reads stdin when omitted)
    script: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "connect_four.toml")]
    config: PathBuf,

    /// Override board width
    #[arg(long)]
    width: Option<usize>,

    /// Override board height
    #[arg(long)]
    height: Option<usize>,

    /// Override number of players
    #[arg(long)]
    players: Option<usize>,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Print a config file with all default values and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(width) = cli.width {
        config.board.width = width;
    }
    if let Some(height) = cli.height {
        config.board.height = height;
    }
    if let Some(players) = cli.players {
        config.players.count = players;
        if config.players.first >= players {
            config.players.first = 0;
        }
    }
    config.validate().context("validating config overrides")?;

    init_tracing(&config.log)?;
    if !cli.config.exists() {
        info!(path = %cli.config.display(), "config file not found, using defaults");
    }

    let script = match &cli.script {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening script {}", path.display()))?;
            script::parse_script(BufReader::new(file))
        }
        None => script::parse_script(io::stdin().lock()),
    }
    .context("parsing script")?;
    if script.is_empty() {
        bail!("script contains no commands");
    }

    let engine = GameEngine::from_config(&config).context("building engine")?;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut replay = Replay::new(engine, format).context("starting game")?;

    let stdout = io::stdout();
    replay
        .run(&script, &mut stdout.lock())
        .context("replaying script")?;

    Ok(())
}

/// Log to stderr so stdout carries only game output.
fn init_tracing(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .with_context(|| format!("invalid log level '{}'", log.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    let result = if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("installing tracing subscriber")
}
