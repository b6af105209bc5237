//! Error types for epigraf modules using thiserror.

use thiserror::Error;

/// Errors from diff construction over the workspace repositories.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to open repository at '{path}': {source}")]
    OpenRepository {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to resolve HEAD: {0}")]
    HeadResolve(#[source] git2::Error),

    #[error("Failed to compute diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to render unified diff text: {0}")]
    PatchRender(#[source] git2::Error),

    #[error("Failed to read repository status: {0}")]
    StatusFailed(#[source] git2::Error),
}

/// Errors from the completion backend.
///
/// [`BackendError::user_message`] distinguishes errors that carry a
/// human-readable message from those that do not; the orchestrator
/// substitutes a fixed unknown-error text for the latter.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error(
        "No API key configured. Set the EPIGRAF_API_KEY or OPENAI_API_KEY environment variable."
    )]
    MissingApiKey,

    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse completion response: {0}")]
    InvalidResponse(String),

    #[error("Completion API returned no candidates")]
    NoCandidates,
}

impl BackendError {
    /// The human-readable message to surface to the user, if the error
    /// carries one.
    pub fn user_message(&self) -> Option<String> {
        match self {
            BackendError::Api { message, .. } => {
                let trimmed = message.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            BackendError::NoCandidates => None,
            other => Some(other.to_string()),
        }
    }
}

/// Errors from the settings store.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,

    #[error("Failed to read settings: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write settings: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseFailed(#[source] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    SerializeFailed(#[source] toml::ser::Error),

    #[error("Failed to lock settings file: {0}")]
    LockFailed(#[source] std::io::Error),
}

/// Errors from the token budgeter.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Failed to load the token encoding table: {0}")]
    EncodingLoad(anyhow::Error),
}
