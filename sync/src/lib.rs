//! # canvasql-sync
//!
//! The synchronization engine between a visual schema graph and SQL DDL
//! text:
//!
//! - [`typemap`] - per-dialect column type lookup
//! - [`generate`] - deterministic DDL generation from a graph
//! - [`repair`] - heuristic pre-processing of hand-edited SQL
//! - [`parse`] - DDL text to a fresh schema graph
//! - [`reconcile`] - layout-preserving merge of old and new graphs
//! - [`controller`] - the apply/cancel/live-edit state machine owning the
//!   single source of truth
//!
//! Everything is pure, synchronous, in-memory computation; the only
//! fallible step is parsing.
//!
//! # Example
//!
//! ```
//! use canvasql_sync::SyncController;
//! use canvasql_types::Dialect;
//!
//! let mut controller = SyncController::new(Dialect::PostgreSQL);
//! controller.update_text("CREATE TABLE users (\n\tid UUID PRIMARY KEY\n);\n");
//! controller.apply()?;
//! assert!(controller.graph().table("users").is_some());
//! # Ok::<(), canvasql_sync::SqlParseError>(())
//! ```

pub mod controller;
pub mod error;
pub mod generate;
pub mod parse;
pub mod reconcile;
pub mod repair;
pub mod typemap;

pub use controller::{SyncController, SyncState};
pub use error::{GenerateWarning, SqlParseError, UnsupportedTypeError, ValidationIssue};
pub use generate::{FOREIGN_KEY_SECTION_HEADER, GenerateOutput, Generator};
pub use parse::parse;
pub use reconcile::reconcile;
pub use repair::{repair, validate_sql_syntax};
