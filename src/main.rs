use std::path::PathBuf;

use clap::Parser;

use supatodo::config::Config;
use supatodo::logging::init_tracing;
use supatodo::model::TodoFilter;
use supatodo::ui::{self, RunOptions};

#[derive(Debug, Parser)]
#[command(name = "supatodo", version, about = "Todo list synced with a Supabase table")]
struct Cli {
    /// Config file (default: ~/.config/supatodo/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to PATH.<timestamp>.<pid> (or set SUPATODO_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Initial filter: all, active or completed
    #[arg(long)]
    filter: Option<TodoFilter>,

    /// Start in grid view
    #[arg(long)]
    grid: bool,

    /// Do not subscribe to the change feed; refresh after each write instead
    #[arg(long)]
    no_realtime: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = init_tracing(cli.log_file.as_deref());
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.no_realtime {
        config.realtime.enabled = false;
    }

    let mut options = RunOptions::from_config(&config);
    if let Some(filter) = cli.filter {
        options.filter = filter;
    }
    if cli.grid {
        options.view = supatodo::config::ViewMode::Grid;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log = ?log_path,
        realtime = config.realtime.enabled,
        "starting"
    );
    let result = ui::run(config, options).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "exited with error");
    }
    result
}
