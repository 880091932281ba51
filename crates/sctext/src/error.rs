//! CLI error types.

use sctext_config::ConfigError;
use sctext_editor::EditorError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Editor(#[from] EditorError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} document(s) failed")]
    Failed(usize),
}
