//! # CanvaSQL
//!
//! Bidirectional synchronization between a visual relational schema
//! graph and hand-editable SQL DDL across PostgreSQL, MySQL, and SQLite:
//! deterministic generation, heuristic repair of hand-edited text,
//! parsing back into the graph, and layout-preserving reconciliation.
//!
//! This crate is a facade over the workspace members:
//! [`canvasql_types`] (the schema graph model) and [`canvasql_sync`]
//! (the engine). A separate `canvasql-cli` crate exposes the same
//! pipeline as a command-line tool.
//!
//! # Quick start
//!
//! ```
//! use canvasql::{Dialect, SyncController};
//!
//! let mut controller = SyncController::new(Dialect::PostgreSQL);
//!
//! // the user edits the DDL text...
//! controller.update_text(
//!     "CREATE TABLE users (\n\tid UUID PRIMARY KEY,\n\temail VARCHAR(255) UNIQUE\n);\n",
//! );
//!
//! // ...and applies it: repair -> parse -> reconcile -> commit
//! controller.apply()?;
//!
//! let users = controller.graph().table("users").unwrap();
//! assert_eq!(users.columns.len(), 2);
//! # Ok::<(), canvasql::SqlParseError>(())
//! ```
//!
//! Or drive the pieces directly:
//!
//! ```
//! use canvasql::{Dialect, Generator, parse, repair};
//!
//! let graph = parse(&repair("CREATE TABLE t (id INTEGER)"))?;
//! let sql = Generator::new(Dialect::MySQL).generate(&graph).sql;
//! assert!(sql.contains("CREATE TABLE t ("));
//! # Ok::<(), canvasql::SqlParseError>(())
//! ```

pub use canvasql_types::{
    Column, ColumnId, ColumnType, Constraint, Dialect, DialectParseError, EdgeId, EnumType,
    ForeignKeyEdge, GraphSettings, NodeLayout, Position, ReferentialAction, SchemaGraph, Table,
    TableId,
};

pub use canvasql_sync::{
    FOREIGN_KEY_SECTION_HEADER, GenerateOutput, GenerateWarning, Generator, SqlParseError,
    SyncController, SyncState, UnsupportedTypeError, ValidationIssue, parse, reconcile, repair,
    validate_sql_syntax,
};

/// Engine modules, re-exported for direct access
pub mod sync {
    pub use canvasql_sync::{controller, error, generate, parse, reconcile, repair, typemap};
}
