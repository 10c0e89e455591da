//! Feelio terminal session: type to talk, say "bye" to finish, Ctrl+C to stop.
//!
//! Reads `.env`, then `config/feelio.toml` (or `--config`), then `FEELIO_*` variables.

use clap::Parser;
use feelio_core::{
    generator, init_logging, DialogueOrchestrator, DialogueSettings, EmotionLabel, FeelioConfig,
    LatestEmotion, LlmMode,
};
use feelio_voice::{ConsoleCapture, OpenRouterTts, SpokenDelivery};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "feelio-session", about = "Emotion-aware dialogue in the terminal")]
struct Args {
    /// TOML config file (overrides FEELIO_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the offline mock generator
    #[arg(long)]
    mock: bool,

    /// Synthesize replies to MP3 files
    #[arg(long)]
    tts: bool,

    /// Emotion label to assume for every turn (no camera in the terminal)
    #[arg(long, default_value = "neutral")]
    emotion: String,

    /// Print the effective configuration (key redacted) and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    if dotenvy::dotenv().is_err() {
        eprintln!("note: no .env file loaded");
    }
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => FeelioConfig::load_from(path),
        None => FeelioConfig::load(),
    };
    let mut cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if args.mock {
        cfg.llm_mode = LlmMode::Mock;
    }
    if args.tts {
        cfg.tts_enabled = true;
    }

    let _guard = init_logging(&cfg.log_level, &cfg.log_file);

    if args.print_config {
        match cfg.to_masked_toml() {
            Ok(toml) => {
                println!("{}", toml);
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Err(e) = cfg.validate() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    let generator = match generator::from_config(&cfg) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(target: "feelio::dialogue", generator = generator.name(), model = %cfg.model_name, "generator ready");

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(target: "feelio::dialogue", "shutdown signal received");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut delivery = SpokenDelivery::console();
    if cfg.tts_enabled {
        match OpenRouterTts::from_config(&cfg) {
            Ok(tts) => delivery = delivery.with_tts(Arc::new(tts), cfg.tts_output_dir.clone()),
            Err(e) => warn!(target: "feelio::voice", error = %e, "TTS disabled"),
        }
    }
    let mut capture = ConsoleCapture::stdin(Duration::from_secs(cfg.speech_timeout_secs));

    let emotions = LatestEmotion::new();
    emotions.set(EmotionLabel::from_label(&args.emotion));

    let mut orchestrator = DialogueOrchestrator::new(generator, DialogueSettings::from_config(&cfg));
    println!("Feelio is listening. Type to talk; say \"bye\" to finish.");

    let summary = orchestrator.run(&mut capture, &mut delivery, &emotions, cancel).await;

    if let Some(text) = &summary.summary {
        let rule = "=".repeat(60);
        println!("\n{rule}\nSESSION SUMMARY\n{rule}\n{text}\n{rule}\n");
    }
    if let Some(path) = &summary.saved_to {
        println!("Session saved to {}", path.display());
    }
    ExitCode::SUCCESS
}
