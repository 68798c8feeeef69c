//! Error types for the library API.

use llm::error::LLMError;
use thiserror::Error;

/// Failures raised while formatting, calling, or interpreting a chain step.
///
/// Every variant is scoped to a single interaction. The apps display the
/// error and keep running; only a missing credential at startup is fatal.
#[derive(Error, Debug)]
pub enum ChainError {
    /// A template referenced a placeholder that no supplied value covers.
    #[error("no value supplied for template placeholder '{name}'")]
    MissingPlaceholder { name: String },

    /// The API key environment variable is absent or empty.
    #[error("environment variable '{var}' is not set")]
    MissingCredential { var: String },

    /// The HTTP call to the completion service failed (includes timeouts).
    #[error("network failure talking to the completion service: {0}")]
    Network(String),

    /// The completion service rejected the credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Any other fault reported by the completion backend.
    #[error("completion call failed: {0}")]
    Completion(String),

    /// The service answered, but with no usable completion text.
    #[error("completion service returned an empty response")]
    EmptyResponse,

    /// The completion text did not decompose into the declared fields.
    #[error("completion did not match the expected structure: {0}")]
    StructureMismatch(String),

    /// A terminal input widget failed.
    #[error("terminal input error: {0}")]
    Input(#[from] dialoguer::Error),
}

impl From<LLMError> for ChainError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::HttpError(msg) => ChainError::Network(msg),
            LLMError::AuthError(msg) => ChainError::Auth(msg),
            other => ChainError::Completion(other.to_string()),
        }
    }
}
