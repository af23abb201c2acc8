//! DDL generation from the schema graph
//!
//! Rendering is deterministic: identical graphs produce byte-identical
//! SQL, which the controller relies on to detect no-op edits and tests
//! rely on for round-tripping. Malformed graphs never abort generation;
//! the offending column or edge is skipped and reported as a
//! [`GenerateWarning`].

use heck::ToSnakeCase;

use canvasql_types::{
    Column, ColumnType, Constraint, Dialect, ForeignKeyEdge, GraphSettings, SchemaGraph, Table,
};

use crate::error::{GenerateWarning, UnsupportedTypeError};
use crate::typemap;

/// Comment header opening the deferred foreign-key section.
///
/// The repair pass matches this string verbatim to find the section it is
/// allowed to deduplicate.
pub const FOREIGN_KEY_SECTION_HEADER: &str = "-- foreign key constraints";

/// Result of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutput {
    /// The rendered DDL
    pub sql: String,
    /// Problems encountered; each one corresponds to a skipped column or
    /// edge
    pub warnings: Vec<GenerateWarning>,
}

/// A foreign-key edge with both endpoints resolved against the graph
struct ResolvedEdge<'a> {
    edge: &'a ForeignKeyEdge,
    source_table: &'a Table,
    source_column: &'a Column,
    target_table: &'a Table,
    target_column: &'a Column,
}

/// DDL generator for one dialect
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    dialect: Dialect,
}

impl Generator {
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The target dialect
    #[inline]
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Render the whole graph as DDL text.
    ///
    /// Statement order: enum types (dialects that support them), tables in
    /// graph order, one `CREATE INDEX` per `Index`-tagged column, then the
    /// deferred foreign-key section.
    #[must_use]
    pub fn generate(&self, graph: &SchemaGraph) -> GenerateOutput {
        let settings = graph.settings;
        let mut warnings = Vec::new();
        let mut statements = Vec::new();

        if self.dialect.supports_enums() {
            for e in &graph.enums {
                statements.push(self.create_enum_sql(&e.name, &e.values, settings));
            }
        }

        let resolved = self.resolve_edges(graph, &mut warnings);

        for table in &graph.tables {
            statements.push(self.create_table_sql(table, graph, &resolved, &mut warnings));
        }

        for table in &graph.tables {
            for column in &table.columns {
                if column.has_constraint(Constraint::Index) {
                    statements.push(self.create_index_sql(table, column, settings));
                }
            }
        }

        if !settings.use_inline_constraints && !resolved.is_empty() {
            let mut block = String::from(FOREIGN_KEY_SECTION_HEADER);
            for r in &resolved {
                block.push('\n');
                block.push_str(&self.alter_table_fk_sql(r, settings));
            }
            statements.push(block);
        }

        for warning in &warnings {
            tracing::warn!(dialect = %self.dialect, %warning, "statement skipped");
        }

        let mut sql = statements.join("\n\n");
        if !sql.is_empty() {
            sql.push('\n');
        }
        GenerateOutput { sql, warnings }
    }

    /// Resolve every edge once; dangling edges become warnings and are
    /// excluded from both inline and deferred emission.
    fn resolve_edges<'a>(
        &self,
        graph: &'a SchemaGraph,
        warnings: &mut Vec<GenerateWarning>,
    ) -> Vec<ResolvedEdge<'a>> {
        let mut resolved = Vec::new();
        for edge in &graph.edges {
            let source = graph.endpoint(&edge.source_table, &edge.source_column);
            let target = graph.endpoint(&edge.target_table, &edge.target_column);
            match (source, target) {
                (Some((st, sc)), Some((tt, tc))) => resolved.push(ResolvedEdge {
                    edge,
                    source_table: st,
                    source_column: sc,
                    target_table: tt,
                    target_column: tc,
                }),
                (source, _) => {
                    let (end, table, column) = if source.is_none() {
                        ("source", &edge.source_table, &edge.source_column)
                    } else {
                        ("target", &edge.target_table, &edge.target_column)
                    };
                    warnings.push(GenerateWarning::DanglingReference {
                        constraint: edge.constraint_name.clone(),
                        detail: format!("{end} `{table}.{column}` does not exist in the graph"),
                    });
                }
            }
        }
        resolved
    }

    fn create_enum_sql(&self, name: &str, values: &[String], settings: GraphSettings) -> String {
        let values = values
            .iter()
            .map(|v| format!("\"{v}\""))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TYPE {} AS ENUM ({values});",
            self.ident(name, settings)
        )
    }

    fn create_table_sql(
        &self,
        table: &Table,
        graph: &SchemaGraph,
        resolved: &[ResolvedEdge<'_>],
        warnings: &mut Vec<GenerateWarning>,
    ) -> String {
        let settings = graph.settings;
        let mut parts = Vec::new();

        for column in &table.columns {
            if let Some(sql) = self.column_sql(table, column, graph, resolved, warnings) {
                parts.push(format!("\t{sql}"));
            }
        }

        if parts.is_empty() {
            format!("CREATE TABLE {} ();", self.ident(&table.label, settings))
        } else {
            format!(
                "CREATE TABLE {} (\n{}\n);",
                self.ident(&table.label, settings),
                parts.join(",\n")
            )
        }
    }

    /// Render one column clause, or `None` (plus a warning) when its type
    /// cannot be mapped.
    fn column_sql(
        &self,
        table: &Table,
        column: &Column,
        graph: &SchemaGraph,
        resolved: &[ResolvedEdge<'_>],
        warnings: &mut Vec<GenerateWarning>,
    ) -> Option<String> {
        let settings = graph.settings;
        let token = match self.type_token(column, graph, settings) {
            Ok(token) => token,
            Err(err) => {
                warnings.push(GenerateWarning::UnsupportedType {
                    table: table.label.clone(),
                    column: column.title.clone(),
                    source: err,
                });
                return None;
            }
        };

        let mut parts = vec![self.ident(&column.title, settings), token];
        if column.has_constraint(Constraint::NotNull) {
            parts.push("NOT NULL".to_string());
        }
        if column.has_constraint(Constraint::Unique) {
            parts.push("UNIQUE".to_string());
        }
        if column.has_constraint(Constraint::Primary) {
            parts.push("PRIMARY KEY".to_string());
        }

        if settings.use_inline_constraints {
            for r in resolved {
                if r.source_table.id == table.id && r.source_column.id == column.id {
                    parts.push(self.references_sql(r, settings));
                }
            }
        }

        Some(parts.join(" "))
    }

    /// Physical type token for a column, resolving enum references against
    /// the graph's declared enum types.
    fn type_token(
        &self,
        column: &Column,
        graph: &SchemaGraph,
        settings: GraphSettings,
    ) -> Result<String, UnsupportedTypeError> {
        match &column.ty {
            ColumnType::Enum(name) => {
                let decl = graph.enum_type(name).ok_or_else(|| UnsupportedTypeError {
                    logical: name.clone(),
                    dialect: self.dialect,
                })?;
                match self.dialect {
                    Dialect::PostgreSQL => Ok(self.ident(&decl.name, settings)),
                    Dialect::MySQL => {
                        let values = decl
                            .values
                            .iter()
                            .map(|v| format!("'{}'", v.replace('\'', "''")))
                            .collect::<Vec<_>>()
                            .join(", ");
                        Ok(format!("ENUM({values})"))
                    }
                    // SQLite has no enum types; TEXT affinity is the
                    // closest faithful rendering.
                    Dialect::SQLite => Ok("TEXT".to_string()),
                }
            }
            scalar => Ok(typemap::physical_type(self.dialect, scalar)?.to_string()),
        }
    }

    fn create_index_sql(&self, table: &Table, column: &Column, settings: GraphSettings) -> String {
        let name = format!(
            "idx_{}_{}",
            table.label.to_snake_case(),
            column.title.to_snake_case()
        );
        format!(
            "CREATE INDEX {} ON {} ({});",
            self.ident(&name, settings),
            self.ident(&table.label, settings),
            self.ident(&column.title, settings)
        )
    }

    fn references_sql(&self, r: &ResolvedEdge<'_>, settings: GraphSettings) -> String {
        let mut sql = format!(
            "REFERENCES {} ({})",
            self.ident(&r.target_table.label, settings),
            self.ident(&r.target_column.title, settings)
        );
        if let Some(action) = r.edge.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = r.edge.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        sql
    }

    fn alter_table_fk_sql(&self, r: &ResolvedEdge<'_>, settings: GraphSettings) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) {};",
            self.ident(&r.source_table.label, settings),
            self.ident(&r.edge.constraint_name, settings),
            self.ident(&r.source_column.title, settings),
            self.references_sql(r, settings)
        )
    }

    /// Quote an identifier when the settings demand it; identifiers with
    /// whitespace are always quoted, bare multi-word identifiers never
    /// reach the output.
    fn ident(&self, name: &str, settings: GraphSettings) -> String {
        if settings.case_sensitive_identifiers || name.contains(char::is_whitespace) {
            let q = self.dialect.quote_char();
            format!("{q}{name}{q}")
        } else {
            name.to_string()
        }
    }
}
