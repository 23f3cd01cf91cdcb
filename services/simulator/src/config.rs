use charmsim_core::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};
use secrecy::SecretString;
use tracing::Level;

/// The character played when `CHARACTER_PERSONA` is not set.
pub const DEFAULT_PERSONA: &str = "A fierce but kind knight from Clash Royale. \
    You are brave, honorable, and love talking about battles and strategy. \
    You have a soft side and appreciate genuine conversation. \
    You value courage and loyalty.";

/// The user bio used when `USER_BIO` is not set.
pub const DEFAULT_USER_BIO: &str = "A strategy game enthusiast who enjoys deep conversations \
    and has a good sense of humor.";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub openai_api_key: SecretString,
    pub api_base: String,
    pub chat_model: String,
    pub log_level: Level,
    pub persona: String,
    pub user_bio: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;

        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let persona =
            std::env::var("CHARACTER_PERSONA").unwrap_or_else(|_| DEFAULT_PERSONA.to_string());
        let user_bio = std::env::var("USER_BIO").unwrap_or_else(|_| DEFAULT_USER_BIO.to_string());

        Ok(Self {
            openai_api_key,
            api_base,
            chat_model,
            log_level,
            persona,
            user_bio,
        })
    }
}
