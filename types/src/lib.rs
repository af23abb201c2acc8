//! # canvasql-types
//!
//! The schema graph model shared by the canvasql engine and its
//! collaborators: tables, columns, constraint tags, foreign-key edges,
//! enum types, layout metadata, and the SQL dialect enum.
//!
//! Everything here is plain data. The graph serializes as camelCase JSON,
//! which is the interchange format with the visual editor.

pub mod dialect;
pub mod graph;
pub mod layout;

pub use dialect::{Dialect, DialectParseError};
pub use graph::{
    Column, ColumnId, ColumnType, Constraint, EdgeId, EnumType, ForeignKeyEdge, GraphSettings,
    ReferentialAction, SchemaGraph, Table, TableId,
};
pub use layout::{NodeLayout, Position};
