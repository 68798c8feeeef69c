//! Environment-backed settings for the apps.
//!
//! Configuration is environment-only: a `.env` file is read at startup and
//! everything else comes from process variables. There is no config file.

use crate::api::ChainError;
use std::env;

/// Environment variable holding the Groq API key.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Optional override for the completion model.
pub const MODEL_VAR: &str = "PERSONA_FORGE_MODEL";

/// Model used when no override is set.
pub const DEFAULT_MODEL: &str = "qwen-qwq-32b";

/// Resolved startup settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
}

/// Loads `.env` (if present) and resolves the settings.
///
/// Called once per app before any chain is built, so a missing key surfaces
/// as [`ChainError::MissingCredential`] before the first network call.
pub fn load() -> Result<Settings, ChainError> {
    dotenv::dotenv().ok();

    let api_key = env::var(API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ChainError::MissingCredential {
            var: API_KEY_VAR.to_string(),
        })?;

    let model = env::var(MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    log::debug!("using completion model '{}'", model);

    Ok(Settings { api_key, model })
}
