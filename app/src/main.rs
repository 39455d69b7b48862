//! Desktop entry point for the memorial board.

use auth::AdminGate;
use clap::Parser;
use std::path::PathBuf;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod backend;
#[allow(dead_code)]
mod config;

#[derive(Parser)]
#[command(name = "memorial", author, version, about = "Memorial photo and video board")]
struct Cli {
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Storage backend: local or firebase
    #[arg(long)]
    backend: Option<config::BackendKind>,
    /// Directory for local media, records, cache and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = config::AppConfigOverrides {
        log_level: cli.log_level,
        backend: cli.backend,
        data_dir: cli.data_dir,
    };
    let cfg = config::AppConfig::load_from(cli.config).apply_overrides(&overrides);

    std::fs::create_dir_all(&cfg.data_dir)?;
    let file_appender = rolling::daily(&cfg.data_dir, "memorial.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_level.clone()))
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    tracing::info!(backend = %cfg.backend, "Starting memorial board");

    let gallery = {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(backend::build_gallery(&cfg))?
    };

    let admin_gate = match AdminGate::resolve(cfg.admin_secret_sha256.as_deref()) {
        Ok(gate) => gate,
        Err(e) => {
            tracing::error!(error = %e, "Admin secret is invalid; admin mode disabled");
            None
        }
    };
    if admin_gate.is_none() {
        tracing::info!("No admin secret configured");
    }

    ui::run(ui::UiFlags {
        gallery: std::sync::Arc::new(gallery),
        admin_gate,
        cache_dir: cfg.data_dir.join("cache"),
        image_workers: cfg.image_workers,
    })?;
    Ok(())
}
