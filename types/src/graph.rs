//! Schema graph model
//!
//! The canonical in-memory model the visual editor and the sync engine
//! exchange: tables with ordered columns, foreign-key edges, enum types,
//! and the generation settings. The graph is replaced wholesale on every
//! successful apply cycle; ids are stable handles the editor can hold on
//! to across regenerations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::NodeLayout;

// =============================================================================
// Ids
// =============================================================================

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Stable, generation-independent table identity
    TableId
);
id_type!(
    /// Stable column identity within a table
    ColumnId
);
id_type!(
    /// Identity of a foreign-key edge
    EdgeId
);

// =============================================================================
// Column types and constraint tags
// =============================================================================

/// Logical column type vocabulary.
///
/// This is the fixed set the visual editor offers; dialect-specific
/// physical type tokens are derived from it by the sync engine's type map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Uuid,
    Varchar,
    Text,
    Int4,
    Money,
    Timestamp,
    Boolean,
    Jsonb,
    Date,
    Time,
    /// Reference to a named [`EnumType`] declared in the graph
    Enum(String),
}

impl ColumnType {
    /// Whether this is a reference to a named enum type
    #[inline]
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self, ColumnType::Enum(_))
    }
}

/// Constraint tag attached to a column.
///
/// Tags are an ordered set: duplicates are rejected on insert, order is
/// the order the user added them (which the generator does not depend on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    Primary,
    Unique,
    NotNull,
    Index,
    ForeignKey,
}

// =============================================================================
// Referential actions
// =============================================================================

/// Foreign key referential action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    /// No action (default)
    #[default]
    NoAction,
    /// Restrict deletion
    Restrict,
    /// Cascade changes
    Cascade,
    /// Set to NULL
    SetNull,
    /// Set to default value
    SetDefault,
}

impl ReferentialAction {
    /// Get the SQL representation
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }

    /// Parse from SQL text
    pub fn from_sql(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NO ACTION" => Some(Self::NoAction),
            "RESTRICT" => Some(Self::Restrict),
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            "SET DEFAULT" => Some(Self::SetDefault),
            _ => None,
        }
    }
}

// =============================================================================
// Columns and tables
// =============================================================================

/// One column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Stable column id
    #[serde(default)]
    pub id: ColumnId,

    /// Column title, unique within its table
    pub title: String,

    /// Logical type
    #[serde(rename = "type")]
    pub ty: ColumnType,

    /// Constraint tags, in user order
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl Column {
    /// Create a column with no constraints
    #[must_use]
    pub fn new(title: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            id: ColumnId::new(),
            title: title.into(),
            ty,
            constraints: Vec::new(),
        }
    }

    /// Builder-style constraint tag, ignoring duplicates
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.add_constraint(constraint);
        self
    }

    /// Add a constraint tag, ignoring duplicates
    pub fn add_constraint(&mut self, constraint: Constraint) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    /// Whether the column carries the given tag
    #[inline]
    #[must_use]
    pub fn has_constraint(&self, constraint: Constraint) -> bool {
        self.constraints.contains(&constraint)
    }
}

/// One table node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Stable table id
    #[serde(default)]
    pub id: TableId,

    /// Display label, unique within the graph
    pub label: String,

    /// Columns in display order
    #[serde(default)]
    pub columns: Vec<Column>,

    /// Visual metadata, opaque to the engine
    #[serde(default)]
    pub layout: NodeLayout,
}

impl Table {
    /// Create an empty table
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: TableId::new(),
            label: label.into(),
            columns: Vec::new(),
            layout: NodeLayout::default(),
        }
    }

    /// Builder-style column append
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Look up a column by exact title
    #[must_use]
    pub fn column(&self, title: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.title == title)
    }

    /// Look up a column by id
    #[must_use]
    pub fn column_by_id(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }
}

// =============================================================================
// Edges and enum types
// =============================================================================

/// A foreign-key relation between two columns.
///
/// Endpoints are held by table label and column title rather than by id:
/// hand-edited DDL can legitimately reference tables that do not (yet)
/// exist, and such dangling edges survive parsing. They are resolved at
/// generation time, where an unresolvable endpoint drops the edge with a
/// reported warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyEdge {
    /// Edge id
    #[serde(default)]
    pub id: EdgeId,

    /// Constraint name, unique across the graph
    pub constraint_name: String,

    /// Owning (source) table label
    pub source_table: String,

    /// Source column title
    pub source_column: String,

    /// Referenced (target) table label
    pub target_table: String,

    /// Referenced column title
    pub target_column: String,

    /// ON DELETE action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,

    /// ON UPDATE action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKeyEdge {
    /// Create an edge with no referential actions
    #[must_use]
    pub fn new(
        constraint_name: impl Into<String>,
        source_table: impl Into<String>,
        source_column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            id: EdgeId::new(),
            constraint_name: constraint_name.into(),
            source_table: source_table.into(),
            source_column: source_column.into(),
            target_table: target_table.into(),
            target_column: target_column.into(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Set the ON DELETE action
    #[must_use]
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Set the ON UPDATE action
    #[must_use]
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// A named enum type (PostgreSQL only at generation time)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumType {
    /// Case-sensitive name, unique within the graph
    pub name: String,

    /// Literal values, in declaration order
    pub values: Vec<String>,
}

impl EnumType {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

// =============================================================================
// Settings and the graph itself
// =============================================================================

/// Generation settings carried with the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSettings {
    /// Quote every identifier when true; identifiers containing whitespace
    /// are quoted regardless
    #[serde(default)]
    pub case_sensitive_identifiers: bool,

    /// Emit foreign keys inside `CREATE TABLE` rather than as a trailing
    /// `ALTER TABLE` section
    #[serde(default)]
    pub use_inline_constraints: bool,
}

/// The whole schema graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraph {
    #[serde(default)]
    pub tables: Vec<Table>,

    #[serde(default)]
    pub edges: Vec<ForeignKeyEdge>,

    #[serde(default)]
    pub enums: Vec<EnumType>,

    #[serde(default)]
    pub settings: GraphSettings,
}

impl SchemaGraph {
    /// Create an empty graph with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the graph has no tables, edges, or enum types
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.edges.is_empty() && self.enums.is_empty()
    }

    /// Look up a table by id
    #[must_use]
    pub fn table_by_id(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Look up a table by exact label
    #[must_use]
    pub fn table(&self, label: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.label == label)
    }

    /// Look up a table by label, ignoring ASCII case
    #[must_use]
    pub fn table_ci(&self, label: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.label.eq_ignore_ascii_case(label))
    }

    /// Look up an enum type by exact (case-sensitive) name
    #[must_use]
    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Resolve an edge endpoint (table label + column title, matched
    /// case-insensitively) to its table and column
    #[must_use]
    pub fn endpoint(&self, table: &str, column: &str) -> Option<(&Table, &Column)> {
        let table = self.table_ci(table)?;
        let column = table
            .columns
            .iter()
            .find(|c| c.title.eq_ignore_ascii_case(column))?;
        Some((table, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_table() -> Table {
        Table::new("users")
            .with_column(
                Column::new("id", ColumnType::Uuid).with_constraint(Constraint::Primary),
            )
            .with_column(
                Column::new("email", ColumnType::Varchar).with_constraint(Constraint::Unique),
            )
    }

    #[test]
    fn test_constraint_dedup() {
        let mut column = Column::new("id", ColumnType::Uuid);
        column.add_constraint(Constraint::Primary);
        column.add_constraint(Constraint::Primary);
        assert_eq!(column.constraints, vec![Constraint::Primary]);
    }

    #[test]
    fn test_table_lookups() {
        let table = users_table();
        assert!(table.column("email").is_some());
        assert!(table.column("Email").is_none());
        let id = table.columns[0].id;
        assert_eq!(table.column_by_id(id).unwrap().title, "id");
    }

    #[test]
    fn test_graph_lookups() {
        let mut graph = SchemaGraph::new();
        graph.tables.push(users_table());
        assert!(graph.table("users").is_some());
        assert!(graph.table("Users").is_none());
        assert!(graph.table_ci("USERS").is_some());
    }

    #[test]
    fn test_edge_resolution() {
        let users = users_table();
        let orders = Table::new("orders")
            .with_column(Column::new("user_id", ColumnType::Uuid));

        let edge = ForeignKeyEdge::new("fk_orders_user_id", "orders", "user_id", "users", "id")
            .on_delete(ReferentialAction::Cascade);

        let mut graph = SchemaGraph::new();
        graph.tables.push(users);
        graph.tables.push(orders);
        graph.edges.push(edge);

        let edge = &graph.edges[0];
        let (table, column) = graph.endpoint(&edge.source_table, &edge.source_column).unwrap();
        assert_eq!(table.label, "orders");
        assert_eq!(column.title, "user_id");
        assert_eq!(edge.on_delete, Some(ReferentialAction::Cascade));

        // endpoints match case-insensitively
        assert!(graph.endpoint("Users", "ID").is_some());
        // a dangling edge is representable; resolution just fails
        assert!(graph.endpoint("missing", "id").is_none());
    }

    #[test]
    fn test_referential_action_sql() {
        assert_eq!(ReferentialAction::Cascade.as_sql(), "CASCADE");
        assert_eq!(ReferentialAction::SetNull.as_sql(), "SET NULL");
        assert_eq!(
            ReferentialAction::from_sql("set null"),
            Some(ReferentialAction::SetNull)
        );
        assert_eq!(ReferentialAction::from_sql("bogus"), None);
    }

    #[test]
    fn test_graph_json_roundtrip() {
        let mut graph = SchemaGraph::new();
        graph.tables.push(users_table());
        graph.enums.push(EnumType::new(
            "status",
            vec!["active".to_string(), "inactive".to_string()],
        ));
        graph.settings.use_inline_constraints = true;

        let json = serde_json::to_string(&graph).unwrap();
        let back: SchemaGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(graph, back);

        // camelCase interchange field names
        assert!(json.contains("caseSensitiveIdentifiers"));
        assert!(json.contains("useInlineConstraints"));
    }

    #[test]
    fn test_column_type_json() {
        let uuid = serde_json::to_value(ColumnType::Uuid).unwrap();
        assert_eq!(uuid, serde_json::json!("uuid"));

        let status = serde_json::to_value(ColumnType::Enum("status".to_string())).unwrap();
        assert_eq!(status, serde_json::json!({ "enum": "status" }));
    }
}
