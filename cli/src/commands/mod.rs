//! CLI subcommand implementations

pub mod check;
pub mod convert;
pub mod generate;
pub mod parse;

use std::path::Path;

use crate::error::CliError;

/// Read a file with path context in the error
pub(crate) fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("failed to read {}: {e}", path.display())))
}

/// Write a file with path context in the error
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents)
        .map_err(|e| CliError::Io(format!("failed to write {}: {e}", path.display())))
}
