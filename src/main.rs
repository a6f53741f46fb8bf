// searchlist - interactive shell over a paged, searchable speaker list
//
// Wires the pieces together:
// - Config: env > file > defaults, with CLI flag overrides
// - Source: HTTP speakers API, or the in-memory demo catalog
// - Coordinator: actor task owning list state, fetches and cancellation
// - Shell: stdin commands in, snapshots and events out

mod cli;

use anyhow::Result;
use clap::Parser;
use searchlist::config::Config;
use searchlist::shell::{self, PrintNavigator};
use searchlist::{logging, CoordinatorBuilder, DemoSource, HttpSource, ListSource, Speaker};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Handle subcommands first (config --show, --reset, --edit, --path)
    if cli::handle_command(&cli)? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
            eprintln!("║  CONFIG ERROR - Cannot load configuration file               ║");
            eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
            eprintln!("  {}\n", e);
            eprintln!("  To reset, run: searchlist config --reset\n");
            std::process::exit(1);
        }
    };

    // CLI flags win over env and file
    if cli.demo {
        config.demo_mode = true;
    }
    if let Some(page_size) = cli.page_size.filter(|&size| size > 0) {
        config.page_size = page_size;
    }

    // Guard flushes file logs on drop, keep it for the whole run
    let _log_guard = logging::init(&config.logging)?;

    let source: Arc<dyn ListSource<Speaker>> = if config.demo_mode {
        tracing::info!(
            catalog_size = config.demo.catalog_size,
            latency_ms = config.demo.latency_ms,
            "Using demo catalog"
        );
        Arc::new(DemoSource::generated(
            config.demo.catalog_size,
            Duration::from_millis(config.demo.latency_ms),
        ))
    } else {
        tracing::info!(api_url = %config.api_url, "Using speakers API");
        Arc::new(HttpSource::from_config(&config)?)
    };

    let navigator = Arc::new(PrintNavigator);
    let handle = CoordinatorBuilder::new(source)
        .page_size(config.page_size)
        .delegate(&navigator)
        .spawn();

    shell::run(handle, cli.query).await
}
