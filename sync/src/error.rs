//! Error and warning taxonomy for the sync engine
//!
//! Only parsing can fail. Repair and reconciliation are total functions;
//! generation degrades gracefully by skipping the offending statement and
//! reporting a [`GenerateWarning`].

use thiserror::Error;

use canvasql_types::Dialect;

/// A logical column type with no physical mapping for the target dialect.
///
/// Raised by the type map; the generator converts it into a
/// [`GenerateWarning::UnsupportedType`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type `{logical}` has no {dialect} mapping")]
pub struct UnsupportedTypeError {
    /// The logical type name as the graph spells it
    pub logical: String,
    /// Target dialect
    pub dialect: Dialect,
}

/// Non-fatal problem encountered while generating DDL.
///
/// The offending column or edge is skipped; the rest of the output is
/// still emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateWarning {
    /// A column whose type could not be mapped; the column is omitted
    #[error("column `{table}.{column}` skipped: {source}")]
    UnsupportedType {
        table: String,
        column: String,
        #[source]
        source: UnsupportedTypeError,
    },

    /// A foreign-key edge referencing a missing table or column; the edge
    /// is omitted
    #[error("foreign key `{constraint}` skipped: {detail}")]
    DanglingReference { constraint: String, detail: String },
}

/// DDL text that does not parse into a schema graph.
///
/// Parsing is atomic: on error no partial graph escapes and the caller's
/// committed state stays untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlParseError {
    /// Human-readable message, rendered to the user as-is
    pub message: String,
    /// Line the failing statement starts on, when determinable
    pub line: Option<usize>,
}

impl SqlParseError {
    /// Error with no line information
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    /// Error anchored to the statement starting at `line` (1-based)
    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl std::fmt::Display for SqlParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (statement starting at line {})", self.message, line),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for SqlParseError {}

/// Advisory finding from [`validate_sql_syntax`](crate::repair::validate_sql_syntax).
///
/// Informational only; never blocks repair or parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// 1-based line the issue was detected on
    pub line: usize,
    /// Description of the structural problem
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = SqlParseError::new("unknown type `blob`");
        assert_eq!(err.to_string(), "unknown type `blob`");

        let err = SqlParseError::at_line("unknown type `blob`", 7);
        assert_eq!(
            err.to_string(),
            "unknown type `blob` (statement starting at line 7)"
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = GenerateWarning::UnsupportedType {
            table: "users".to_string(),
            column: "avatar".to_string(),
            source: UnsupportedTypeError {
                logical: "blob".to_string(),
                dialect: Dialect::PostgreSQL,
            },
        };
        assert_eq!(
            warning.to_string(),
            "column `users.avatar` skipped: type `blob` has no postgresql mapping"
        );
    }
}
