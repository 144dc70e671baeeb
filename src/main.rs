use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use streamscribe::cli::Cli;
use streamscribe::config::Config;
use streamscribe::stt::{Transcriber, WhisperConfig, WhisperTranscriber};
use streamscribe::{server, version_string};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?.with_env_overrides();
    cli.apply_to(&mut config);

    // The guard must outlive main or buffered log lines are lost.
    let _log_guard = init_logging(&config, cli.verbose)?;

    info!(version = %version_string(), "starting streamscribe");

    let transcriber = build_transcriber(&config)?;
    if !transcriber.is_ready() {
        warn!(
            model = transcriber.model_name(),
            "transcriber not ready; audio will produce error events"
        );
    }

    server::serve(config, transcriber).await?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load(path).with_context(|| format!("loading config from {}", path.display()))
        }
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path),
            None => Ok(Config::default()),
        },
    }
}

/// Initializes the tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise verbosity comes from `-v` flags.
/// With a configured log directory, output goes to daily-rotated files there
/// as well as stdout; the directory is created and probed for writability
/// first so misconfiguration fails at startup rather than silently.
fn init_logging(config: &Config, verbose: u8) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("streamscribe={},tower_http=warn", default_level)));

    match &config.server.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let probe = dir.join(".write-probe");
            std::fs::write(&probe, b"")
                .with_context(|| format!("log directory {} is not writable", dir.display()))?;
            let _ = std::fs::remove_file(&probe);

            let appender = tracing_appender::rolling::daily(dir, "streamscribe.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file_writer.and(std::io::stdout))
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}

fn build_transcriber(config: &Config) -> Result<Arc<dyn Transcriber>> {
    let whisper = WhisperTranscriber::new(WhisperConfig {
        model_path: config.stt.model.clone(),
        language: config.stt.language.clone(),
        threads: None,
    })
    .with_context(|| format!("loading model from {}", config.stt.model.display()))?;
    Ok(Arc::new(whisper))
}
