//! Dialect type map
//!
//! Pure lookup between the logical column-type vocabulary and each
//! dialect's physical type tokens. The forward direction is injective per
//! dialect so that generated DDL parses back to the same logical types;
//! the inverse direction additionally accepts common aliases seen in
//! hand-written DDL (`int`, `bool`, `datetime`, `character varying`, ...).
//!
//! Enum references are not resolved here: callers look the enum up in the
//! graph first, because the physical rendering needs the declared values
//! (MySQL) or the type name itself (PostgreSQL). Passing an enum reference
//! to [`physical_type`] is an [`UnsupportedTypeError`].

use canvasql_types::{ColumnType, Dialect};

use crate::error::UnsupportedTypeError;

/// Map a logical type to the dialect's physical type token.
///
/// # Errors
///
/// Returns [`UnsupportedTypeError`] for [`ColumnType::Enum`] — enum
/// references must be resolved against the graph by the caller.
pub fn physical_type(
    dialect: Dialect,
    ty: &ColumnType,
) -> Result<&'static str, UnsupportedTypeError> {
    let token = match (dialect, ty) {
        (_, ColumnType::Enum(name)) => {
            return Err(UnsupportedTypeError {
                logical: name.clone(),
                dialect,
            });
        }

        (Dialect::PostgreSQL, ColumnType::Uuid) => "UUID",
        (Dialect::PostgreSQL, ColumnType::Varchar) => "VARCHAR(255)",
        (Dialect::PostgreSQL, ColumnType::Text) => "TEXT",
        (Dialect::PostgreSQL, ColumnType::Int4) => "INTEGER",
        (Dialect::PostgreSQL, ColumnType::Money) => "MONEY",
        (Dialect::PostgreSQL, ColumnType::Timestamp) => "TIMESTAMP",
        (Dialect::PostgreSQL, ColumnType::Boolean) => "BOOLEAN",
        (Dialect::PostgreSQL, ColumnType::Jsonb) => "JSONB",
        (Dialect::PostgreSQL, ColumnType::Date) => "DATE",
        (Dialect::PostgreSQL, ColumnType::Time) => "TIME",

        (Dialect::MySQL, ColumnType::Uuid) => "CHAR(36)",
        (Dialect::MySQL, ColumnType::Varchar) => "VARCHAR(255)",
        (Dialect::MySQL, ColumnType::Text) => "TEXT",
        (Dialect::MySQL, ColumnType::Int4) => "INT",
        (Dialect::MySQL, ColumnType::Money) => "DECIMAL(19,4)",
        (Dialect::MySQL, ColumnType::Timestamp) => "DATETIME",
        (Dialect::MySQL, ColumnType::Boolean) => "TINYINT(1)",
        (Dialect::MySQL, ColumnType::Jsonb) => "JSON",
        (Dialect::MySQL, ColumnType::Date) => "DATE",
        (Dialect::MySQL, ColumnType::Time) => "TIME",

        (Dialect::SQLite, ColumnType::Uuid) => "UUID",
        (Dialect::SQLite, ColumnType::Varchar) => "VARCHAR(255)",
        (Dialect::SQLite, ColumnType::Text) => "TEXT",
        (Dialect::SQLite, ColumnType::Int4) => "INTEGER",
        (Dialect::SQLite, ColumnType::Money) => "NUMERIC",
        (Dialect::SQLite, ColumnType::Timestamp) => "TIMESTAMP",
        (Dialect::SQLite, ColumnType::Boolean) => "BOOLEAN",
        (Dialect::SQLite, ColumnType::Jsonb) => "JSONB",
        (Dialect::SQLite, ColumnType::Date) => "DATE",
        (Dialect::SQLite, ColumnType::Time) => "TIME",
    };
    Ok(token)
}

/// Map a physical type token back to the logical vocabulary.
///
/// Dialect-agnostic and case-insensitive: hand-edited DDL freely mixes
/// dialect spellings, so every dialect's tokens (and common aliases) are
/// accepted. Returns `None` for tokens outside the vocabulary; the parser
/// treats that as a hard error after checking declared enum names.
#[must_use]
pub fn logical_type(token: &str) -> Option<ColumnType> {
    let normalized = normalize(token);
    let (base, args) = split_args(&normalized);

    let ty = match base {
        "UUID" => ColumnType::Uuid,
        "CHAR" if args == Some("36") => ColumnType::Uuid,

        "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" | "CHAR" => ColumnType::Varchar,

        "TEXT" | "CLOB" | "LONGTEXT" | "MEDIUMTEXT" => ColumnType::Text,

        "INT4" | "INT" | "INTEGER" | "SERIAL" | "SMALLINT" | "BIGINT" | "INT2" | "INT8" => {
            ColumnType::Int4
        }
        "TINYINT" if args == Some("1") => ColumnType::Boolean,
        "TINYINT" => ColumnType::Int4,

        "MONEY" | "DECIMAL" | "NUMERIC" => ColumnType::Money,

        "TIMESTAMP" | "TIMESTAMPTZ" | "DATETIME" | "TIMESTAMP WITH TIME ZONE"
        | "TIMESTAMP WITHOUT TIME ZONE" => ColumnType::Timestamp,

        "BOOLEAN" | "BOOL" => ColumnType::Boolean,

        "JSONB" | "JSON" => ColumnType::Jsonb,

        "DATE" => ColumnType::Date,

        "TIME" | "TIMETZ" | "TIME WITH TIME ZONE" | "TIME WITHOUT TIME ZONE" => ColumnType::Time,

        _ => return None,
    };
    Some(ty)
}

/// Uppercase and collapse internal whitespace
fn normalize(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Split `VARCHAR(255)` into `("VARCHAR", Some("255"))`
fn split_args(token: &str) -> (&str, Option<&str>) {
    match (token.find('('), token.rfind(')')) {
        (Some(open), Some(close)) if close > open => {
            (token[..open].trim_end(), Some(token[open + 1..close].trim()))
        }
        _ => (token, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_map() {
        assert_eq!(
            physical_type(Dialect::PostgreSQL, &ColumnType::Uuid).unwrap(),
            "UUID"
        );
        assert_eq!(
            physical_type(Dialect::MySQL, &ColumnType::Boolean).unwrap(),
            "TINYINT(1)"
        );
        assert_eq!(
            physical_type(Dialect::SQLite, &ColumnType::Money).unwrap(),
            "NUMERIC"
        );
    }

    #[test]
    fn test_enum_reference_is_unsupported_here() {
        let err = physical_type(Dialect::MySQL, &ColumnType::Enum("status".to_string()))
            .unwrap_err();
        assert_eq!(err.logical, "status");
        assert_eq!(err.dialect, Dialect::MySQL);
    }

    #[test]
    fn test_forward_map_is_injective_per_dialect() {
        let scalars = [
            ColumnType::Uuid,
            ColumnType::Varchar,
            ColumnType::Text,
            ColumnType::Int4,
            ColumnType::Money,
            ColumnType::Timestamp,
            ColumnType::Boolean,
            ColumnType::Jsonb,
            ColumnType::Date,
            ColumnType::Time,
        ];
        for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
            let mut seen = std::collections::HashSet::new();
            for ty in &scalars {
                let token = physical_type(dialect, ty).unwrap();
                assert!(seen.insert(token), "{dialect}: duplicate token {token}");
            }
        }
    }

    #[test]
    fn test_inverse_map_roundtrips_forward_map() {
        let scalars = [
            ColumnType::Uuid,
            ColumnType::Varchar,
            ColumnType::Text,
            ColumnType::Int4,
            ColumnType::Money,
            ColumnType::Timestamp,
            ColumnType::Boolean,
            ColumnType::Jsonb,
            ColumnType::Date,
            ColumnType::Time,
        ];
        for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
            for ty in &scalars {
                let token = physical_type(dialect, ty).unwrap();
                assert_eq!(logical_type(token).as_ref(), Some(ty), "{dialect} {token}");
            }
        }
    }

    #[test]
    fn test_inverse_aliases() {
        assert_eq!(logical_type("int"), Some(ColumnType::Int4));
        assert_eq!(logical_type("serial"), Some(ColumnType::Int4));
        assert_eq!(logical_type("bool"), Some(ColumnType::Boolean));
        assert_eq!(logical_type("json"), Some(ColumnType::Jsonb));
        assert_eq!(logical_type("varchar(64)"), Some(ColumnType::Varchar));
        assert_eq!(
            logical_type("character varying(80)"),
            Some(ColumnType::Varchar)
        );
        assert_eq!(
            logical_type("timestamp   with time zone"),
            Some(ColumnType::Timestamp)
        );
        assert_eq!(logical_type("blob"), None);
        assert_eq!(logical_type(""), None);
    }
}
