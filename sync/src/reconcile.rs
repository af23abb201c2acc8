//! Graph reconciliation
//!
//! A freshly parsed graph carries new ids and default layout. Reconciling
//! it against the previously committed graph copies layout (and retains
//! stable ids) for tables that can be matched, so a round trip through
//! DDL text does not scatter the canvas.
//!
//! Matching is deliberately lossy: a table renamed and retyped in one
//! edit is indistinguishable from a delete plus a create, and no finer
//! diff provenance is tracked.

use std::collections::HashSet;

use canvasql_types::{SchemaGraph, TableId};

/// Merge layout from `old` into `new`.
///
/// For each table in `new`: match by exact id, else by case-insensitive
/// label. Each old table is claimed at most once. On a match the new
/// table takes the old table's layout and id, so the editor's handle on
/// the table stays stable across applies; everything describing schema
/// comes from `new` alone. Unmatched tables keep their default layout.
/// Total function, never fails.
#[must_use]
pub fn reconcile(old: &SchemaGraph, new: SchemaGraph) -> SchemaGraph {
    let mut merged = new;
    let mut claimed: HashSet<TableId> = HashSet::new();

    for table in &mut merged.tables {
        let hit = old
            .tables
            .iter()
            .find(|t| t.id == table.id && !claimed.contains(&t.id))
            .or_else(|| {
                old.tables
                    .iter()
                    .find(|t| !claimed.contains(&t.id) && t.label.eq_ignore_ascii_case(&table.label))
            });
        if let Some(old_table) = hit {
            claimed.insert(old_table.id);
            table.layout = old_table.layout.clone();
            table.id = old_table.id;
        }
    }

    merged
}
