//! Unified SQL dialect enum
//!
//! Single source of truth for dialect identification. Each dialect carries
//! its own identifier quoting character and type-name conventions; the
//! per-type mappings themselves live in `canvasql-sync`.

/// SQL dialect targeted by DDL generation and accepted by the parser.
///
/// # Examples
///
/// ```
/// use canvasql_types::Dialect;
///
/// let dialect = Dialect::PostgreSQL;
/// assert!(dialect.supports_enums());
/// assert_eq!(Dialect::MySQL.quote_char(), '`');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL - double-quote identifier quoting, native enum types
    #[default]
    PostgreSQL,

    /// MySQL - backtick identifier quoting
    MySQL,

    /// SQLite - double-quote identifier quoting
    SQLite,
}

impl Dialect {
    /// Parse a dialect from a string (case-insensitive)
    ///
    /// Supports common aliases:
    /// - PostgreSQL: `"postgresql"`, `"postgres"`, `"pg"`
    /// - MySQL: `"mysql"`, `"mariadb"`
    /// - SQLite: `"sqlite"`, `"sqlite3"`
    ///
    /// # Examples
    ///
    /// ```
    /// use canvasql_types::Dialect;
    ///
    /// assert_eq!(Dialect::parse("postgresql"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("pg")
        {
            Some(Dialect::PostgreSQL)
        } else if s.eq_ignore_ascii_case("mysql") || s.eq_ignore_ascii_case("mariadb") {
            Some(Dialect::MySQL)
        } else if s.eq_ignore_ascii_case("sqlite") || s.eq_ignore_ascii_case("sqlite3") {
            Some(Dialect::SQLite)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
            Dialect::SQLite => "sqlite",
        }
    }

    /// The identifier quote character for this dialect
    #[inline]
    #[must_use]
    pub const fn quote_char(&self) -> char {
        match self {
            Dialect::PostgreSQL | Dialect::SQLite => '"',
            Dialect::MySQL => '`',
        }
    }

    /// Whether the dialect supports named enum types (`CREATE TYPE .. AS ENUM`)
    #[inline]
    #[must_use]
    pub const fn supports_enums(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectParseError;

impl core::fmt::Display for DialectParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown dialect")
    }
}

impl std::error::Error for DialectParseError {}
