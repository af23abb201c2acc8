//! Error types for the CLI

use thiserror::Error;

use canvasql_sync::SqlParseError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// I/O error with file context
    #[error("I/O error: {0}")]
    Io(String),

    /// Schema graph JSON that does not deserialize
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// DDL that does not parse
    #[error("parse failed: {0}")]
    Parse(#[from] SqlParseError),
}
