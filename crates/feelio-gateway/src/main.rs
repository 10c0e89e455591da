//! Feelio gateway binary. Binds `bind_addr` (default 127.0.0.1:8000).

use clap::Parser;
use feelio_core::{generator, init_logging, DialogueSettings, FeelioConfig, LlmMode};
use feelio_gateway::{build_app, AppState};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "feelio-gateway", about = "Feelio HTTP gateway")]
struct Args {
    /// TOML config file (overrides FEELIO_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<String>,

    /// Use the offline mock generator
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if dotenvy::dotenv().is_err() {
        eprintln!("note: no .env file loaded");
    }
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => FeelioConfig::load_from(path)?,
        None => FeelioConfig::load()?,
    };
    if args.mock {
        cfg.llm_mode = LlmMode::Mock;
    }
    if let Some(bind) = args.bind {
        cfg.bind_addr = bind;
    }

    let _guard = init_logging(&cfg.log_level, &cfg.log_file);
    cfg.validate()?;

    let generator = generator::from_config(&cfg)?;
    tracing::info!(target: "feelio::gateway", generator = generator.name(), model = %cfg.model_name, "generator ready");

    let state = AppState::new(generator, DialogueSettings::from_config(&cfg));
    let app = build_app(state.clone());

    let idle_ttl = Duration::from_secs(cfg.session_idle_timeout_secs);
    let sweeper = state.spawn_idle_sweeper(idle_ttl, idle_ttl.min(Duration::from_secs(60)));

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(target: "feelio::gateway", addr = %cfg.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!(target: "feelio::gateway", "shutdown signal received");
        })
        .await?;

    sweeper.abort();
    let closed = state.close_all().await;
    tracing::info!(target: "feelio::gateway", sessions = closed.len(), "open sessions finalized");
    Ok(())
}
