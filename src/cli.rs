use clap::Parser;
use std::path::PathBuf;

/// Streaming speech-to-text relay server.
///
/// Accepts raw PCM audio over WebSocket and streams back partial and final
/// transcriptions as speech stabilizes.
#[derive(Parser, Debug)]
#[command(name = "streamscribe", version = crate::version_string())]
pub struct Cli {
    /// Path to config file (default: ~/.config/streamscribe/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to the speech recognition model (overrides config)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Fallback language code, or "auto" to detect (overrides config)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Directory for rotating log files (overrides config)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Fold CLI overrides into a loaded configuration.
    pub fn apply_to(&self, config: &mut crate::config::Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model) = &self.model {
            config.stt.model = model.clone();
        }
        if let Some(language) = &self.language {
            config.stt.language = language.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            config.server.log_dir = Some(log_dir.clone());
        }
    }
}
