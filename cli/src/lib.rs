//! # canvasql-cli
//!
//! Library surface of the `canvasql` binary: file-based conversion
//! between schema graph JSON and SQL DDL, plus validation/repair
//! reporting. The engine itself never touches the filesystem; all I/O
//! happens here at the boundary.

pub mod commands;
pub mod error;
pub mod output;
