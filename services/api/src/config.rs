use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported backends for the capability collaborators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    /// Chat, speech and transcription all go to OpenAI.
    OpenAI,
    /// Chat goes to Gemini's OpenAI-compatible endpoint; speech is placeholder.
    Gemini,
    /// Canned responses everywhere. Needs no credentials.
    Placeholder,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub chat_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub stt_model: String,
    pub log_level: Level,
    pub prompts_path: PathBuf,
    /// Messages sent as context per reply; zero means the whole transcript.
    pub history_window: usize,
    pub voice_enabled: bool,
    /// Seconds a session may go unused before it is dropped; zero keeps
    /// sessions until deleted.
    pub session_idle_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            provider: Provider::Placeholder,
            openai_api_key: None,
            gemini_api_key: None,
            chat_model: "gpt-4o".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            stt_model: "whisper-1".to_string(),
            log_level: Level::INFO,
            prompts_path: PathBuf::from("./prompts"),
            history_window: 40,
            voice_enabled: false,
            session_idle_secs: 3600,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Config::default();

        let bind_address = parse_var("BIND_ADDRESS", defaults.bind_address)?;

        let provider_str = std::env::var("PROVIDER").unwrap_or_else(|_| "placeholder".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            "gemini" => Provider::Gemini,
            "placeholder" => Provider::Placeholder,
            other => {
                return Err(ConfigError::InvalidValue(
                    "PROVIDER".to_string(),
                    format!("'{}' is not one of openai, gemini, placeholder", other),
                ));
            }
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();

        let chat_model = std::env::var("CHAT_MODEL").unwrap_or(defaults.chat_model);
        let tts_model = std::env::var("TTS_MODEL").unwrap_or(defaults.tts_model);
        let tts_voice = std::env::var("TTS_VOICE").unwrap_or(defaults.tts_voice);
        let stt_model = std::env::var("STT_MODEL").unwrap_or(defaults.stt_model);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.prompts_path);

        let history_window = parse_var("HISTORY_WINDOW", defaults.history_window)?;
        let voice_enabled = parse_var("VOICE_ENABLED", defaults.voice_enabled)?;
        let session_idle_secs = parse_var("SESSION_IDLE_SECS", defaults.session_idle_secs)?;

        match provider {
            Provider::OpenAI => {
                if openai_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
                    ));
                }
            }
            Provider::Gemini => {
                if gemini_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "GEMINI_API_KEY must be set for 'gemini' provider".to_string(),
                    ));
                }
            }
            Provider::Placeholder => {}
        }

        Ok(Self {
            bind_address,
            provider,
            openai_api_key,
            gemini_api_key,
            chat_model,
            tts_model,
            tts_voice,
            stt_model,
            log_level,
            prompts_path,
            history_window,
            voice_enabled,
            session_idle_secs,
        })
    }
}
