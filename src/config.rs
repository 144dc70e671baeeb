use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub streaming: StreamingConfig,
}

/// Network and transport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_message_bytes: usize,
    pub enable_health: bool,
    pub log_dir: Option<PathBuf>,
}

/// Audio format configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of inbound PCM; fixed per deployment, not per session.
    pub sample_rate: u32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: PathBuf,
    pub language: String,
}

/// Windowing and emission configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    pub window_secs: f32,
    pub keep_secs: f32,
    pub emit_interval_secs: f32,
    pub stability_timeout_secs: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            max_message_bytes: defaults::MAX_MESSAGE_BYTES,
            enable_health: true,
            log_dir: None,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from(defaults::DEFAULT_MODEL_PATH),
            language: defaults::AUTO_LANGUAGE.to_string(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            window_secs: defaults::WINDOW_SECS,
            keep_secs: defaults::KEEP_SECS,
            emit_interval_secs: defaults::EMIT_INTERVAL_SECS,
            stability_timeout_secs: defaults::STABILITY_TIMEOUT_SECS,
        }
    }
}

impl StreamingConfig {
    /// Minimum interval between inference attempts as a Duration.
    pub fn emit_interval(&self) -> Duration {
        Duration::from_secs_f32(self.emit_interval_secs)
    }

    /// Partial-stability timeout as a Duration.
    pub fn stability_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.stability_timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - STREAMSCRIBE_HOST → server.host
    /// - STREAMSCRIBE_PORT → server.port
    /// - STREAMSCRIBE_MODEL → stt.model
    /// - STREAMSCRIBE_LANGUAGE → stt.language
    /// - STREAMSCRIBE_LOG_DIR → server.log_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("STREAMSCRIBE_HOST")
            && !host.is_empty()
        {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("STREAMSCRIBE_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }

        if let Ok(model) = std::env::var("STREAMSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.stt.model = PathBuf::from(model);
        }

        if let Ok(language) = std::env::var("STREAMSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(log_dir) = std::env::var("STREAMSCRIBE_LOG_DIR")
            && !log_dir.is_empty()
        {
            self.server.log_dir = Some(PathBuf::from(log_dir));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/streamscribe/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("streamscribe")
                .join("config.toml")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_streamscribe_env() {
        remove_env("STREAMSCRIBE_HOST");
        remove_env("STREAMSCRIBE_PORT");
        remove_env("STREAMSCRIBE_MODEL");
        remove_env("STREAMSCRIBE_LANGUAGE");
        remove_env("STREAMSCRIBE_LOG_DIR");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8765);
        assert_eq!(config.server.max_message_bytes, 8 * 1024 * 1024);
        assert!(config.server.enable_health);
        assert_eq!(config.server.log_dir, None);

        assert_eq!(config.audio.sample_rate, 16000);

        assert_eq!(config.stt.model, PathBuf::from("models/ggml-base.bin"));
        assert_eq!(config.stt.language, "auto");

        assert_eq!(config.streaming.window_secs, 2.0);
        assert_eq!(config.streaming.keep_secs, 1.25);
        assert_eq!(config.streaming.emit_interval_secs, 0.25);
        assert_eq!(config.streaming.stability_timeout_secs, 1.0);
    }

    #[test]
    fn test_duration_helpers() {
        let streaming = StreamingConfig::default();
        assert_eq!(streaming.emit_interval(), Duration::from_millis(250));
        assert_eq!(streaming.stability_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            max_message_bytes = 1048576
            enable_health = false
            log_dir = "/var/log/streamscribe"

            [audio]
            sample_rate = 8000

            [stt]
            model = "/models/ggml-small.bin"
            language = "de"

            [streaming]
            window_secs = 3.0
            keep_secs = 1.5
            emit_interval_secs = 0.5
            stability_timeout_secs = 2.0
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_message_bytes, 1048576);
        assert!(!config.server.enable_health);
        assert_eq!(
            config.server.log_dir,
            Some(PathBuf::from("/var/log/streamscribe"))
        );

        assert_eq!(config.audio.sample_rate, 8000);
        assert_eq!(config.stt.model, PathBuf::from("/models/ggml-small.bin"));
        assert_eq!(config.stt.language, "de");

        assert_eq!(config.streaming.window_secs, 3.0);
        assert_eq!(config.streaming.keep_secs, 1.5);
        assert_eq!(config.streaming.emit_interval_secs, 0.5);
        assert_eq!(config.streaming.stability_timeout_secs, 2.0);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let toml_content = r#"
            [server]
            port = 9999
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.streaming.window_secs, 2.0);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = r#"
            [server
            host = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_streamscribe_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_fails_on_invalid_toml() {
        let invalid_toml = r#"
            [server
            host = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_env_override_host_and_port() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_streamscribe_env();

        set_env("STREAMSCRIBE_HOST", "0.0.0.0");
        set_env("STREAMSCRIBE_PORT", "9001");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9001);

        clear_streamscribe_env();
    }

    #[test]
    fn test_env_override_model_and_language() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_streamscribe_env();

        set_env("STREAMSCRIBE_MODEL", "/models/ggml-tiny.bin");
        set_env("STREAMSCRIBE_LANGUAGE", "fr");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.stt.model, PathBuf::from("/models/ggml-tiny.bin"));
        assert_eq!(config.stt.language, "fr");

        clear_streamscribe_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_streamscribe_env();

        set_env("STREAMSCRIBE_HOST", "");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.server.host, "127.0.0.1");

        clear_streamscribe_env();
    }

    #[test]
    fn test_env_override_invalid_port_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_streamscribe_env();

        set_env("STREAMSCRIBE_PORT", "not-a-port");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.server.port, 8765);

        clear_streamscribe_env();
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        if let Some(path) = Config::default_path() {
            let path_str = path.to_string_lossy();
            assert!(path_str.contains(".config"));
            assert!(path_str.contains("streamscribe"));
            assert!(path_str.ends_with("config.toml"));
        }
    }
}
