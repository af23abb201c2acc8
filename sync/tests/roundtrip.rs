//! End-to-end properties of the generate/repair/parse pipeline:
//! round-trip isomorphism per dialect, determinism, repair idempotence,
//! and the foreign-key dedup scenarios.

use std::collections::BTreeSet;

use canvasql_sync::{Generator, parse, repair};
use canvasql_types::{
    Column, ColumnType, Constraint, Dialect, EnumType, ForeignKeyEdge, GraphSettings,
    ReferentialAction, SchemaGraph, Table,
};

fn sample_graph(inline: bool) -> SchemaGraph {
    let users = Table::new("users")
        .with_column(Column::new("id", ColumnType::Uuid).with_constraint(Constraint::Primary))
        .with_column(
            Column::new("email", ColumnType::Varchar)
                .with_constraint(Constraint::NotNull)
                .with_constraint(Constraint::Unique),
        );

    let orders = Table::new("orders")
        .with_column(Column::new("id", ColumnType::Uuid).with_constraint(Constraint::Primary))
        .with_column(
            Column::new("user_id", ColumnType::Uuid).with_constraint(Constraint::ForeignKey),
        )
        .with_column(Column::new("total", ColumnType::Money))
        .with_column(
            Column::new("placed_at", ColumnType::Timestamp).with_constraint(Constraint::Index),
        )
        .with_column(Column::new("paid", ColumnType::Boolean))
        .with_column(Column::new("meta", ColumnType::Jsonb))
        .with_column(Column::new("note", ColumnType::Text))
        .with_column(Column::new("qty", ColumnType::Int4))
        .with_column(Column::new("day", ColumnType::Date))
        .with_column(Column::new("moment", ColumnType::Time));

    let edge = ForeignKeyEdge::new("fk_orders_user_id", "orders", "user_id", "users", "id")
        .on_delete(ReferentialAction::Cascade);

    let mut graph = SchemaGraph::new();
    graph.settings.use_inline_constraints = inline;
    graph.tables.push(users);
    graph.tables.push(orders);
    graph.edges.push(edge);
    graph
}

/// Compare two graphs up to id renumbering: same tables, columns, types,
/// constraint tags, edges, and enum types.
fn assert_isomorphic(a: &SchemaGraph, b: &SchemaGraph) {
    assert_eq!(a.tables.len(), b.tables.len(), "table count");
    for (ta, tb) in a.tables.iter().zip(&b.tables) {
        assert_eq!(ta.label, tb.label, "table label");
        assert_eq!(ta.columns.len(), tb.columns.len(), "columns of {}", ta.label);
        for (ca, cb) in ta.columns.iter().zip(&tb.columns) {
            assert_eq!(ca.title, cb.title, "column title in {}", ta.label);
            assert_eq!(ca.ty, cb.ty, "type of {}.{}", ta.label, ca.title);
            let tags_a: BTreeSet<String> =
                ca.constraints.iter().map(|c| format!("{c:?}")).collect();
            let tags_b: BTreeSet<String> =
                cb.constraints.iter().map(|c| format!("{c:?}")).collect();
            assert_eq!(tags_a, tags_b, "tags of {}.{}", ta.label, ca.title);
        }
    }

    let edges = |g: &SchemaGraph| -> Vec<_> {
        g.edges
            .iter()
            .map(|e| {
                (
                    e.constraint_name.clone(),
                    e.source_table.clone(),
                    e.source_column.clone(),
                    e.target_table.clone(),
                    e.target_column.clone(),
                    e.on_delete,
                    e.on_update,
                )
            })
            .collect()
    };
    assert_eq!(edges(a), edges(b), "edges");
    assert_eq!(a.enums, b.enums, "enum types");
}

fn roundtrip(dialect: Dialect, graph: &SchemaGraph) -> SchemaGraph {
    let out = Generator::new(dialect).generate(graph);
    assert!(out.warnings.is_empty(), "warnings: {:?}", out.warnings);
    parse(&out.sql).unwrap_or_else(|err| panic!("{dialect}: {err}\n---\n{}", out.sql))
}

#[test]
fn roundtrip_postgresql_deferred_constraints() {
    let graph = sample_graph(false);
    assert_isomorphic(&graph, &roundtrip(Dialect::PostgreSQL, &graph));
}

#[test]
fn roundtrip_postgresql_inline_constraints() {
    let graph = sample_graph(true);
    assert_isomorphic(&graph, &roundtrip(Dialect::PostgreSQL, &graph));
}

#[test]
fn roundtrip_mysql() {
    let graph = sample_graph(false);
    assert_isomorphic(&graph, &roundtrip(Dialect::MySQL, &graph));
}

#[test]
fn roundtrip_sqlite() {
    let graph = sample_graph(false);
    assert_isomorphic(&graph, &roundtrip(Dialect::SQLite, &graph));
}

#[test]
fn roundtrip_postgresql_with_enums() {
    let mut graph = sample_graph(false);
    graph.enums.push(EnumType::new(
        "status",
        vec!["active".to_string(), "inactive".to_string()],
    ));
    graph.tables.push(
        Table::new("jobs")
            .with_column(Column::new("id", ColumnType::Uuid).with_constraint(Constraint::Primary))
            .with_column(Column::new("state", ColumnType::Enum("status".to_string()))),
    );
    assert_isomorphic(&graph, &roundtrip(Dialect::PostgreSQL, &graph));
}

#[test]
fn roundtrip_case_sensitive_identifiers() {
    let mut graph = sample_graph(false);
    graph.settings.case_sensitive_identifiers = true;
    graph.tables[0].label = "Users".to_string();
    graph.edges[0].target_table = "Users".to_string();

    for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
        let parsed = roundtrip(dialect, &graph);
        assert_eq!(parsed.tables[0].label, "Users", "{dialect}");
        assert_isomorphic(&graph, &parsed);
    }
}

#[test]
fn roundtrip_whitespace_identifiers_survive_bare_settings() {
    let mut graph = SchemaGraph::new();
    graph.tables.push(
        Table::new("Customer Orders").with_column(
            Column::new("placed at", ColumnType::Timestamp).with_constraint(Constraint::NotNull),
        ),
    );
    for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
        let parsed = roundtrip(dialect, &graph);
        assert_eq!(parsed.tables[0].label, "Customer Orders", "{dialect}");
        assert_eq!(parsed.tables[0].columns[0].title, "placed at");
    }
}

#[test]
fn generation_is_deterministic_across_calls() {
    let graph = sample_graph(false);
    for dialect in [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite] {
        let a = Generator::new(dialect).generate(&graph);
        let b = Generator::new(dialect).generate(&graph);
        assert_eq!(a.sql, b.sql, "{dialect}");
    }
}

#[test]
fn repair_is_idempotent_on_generated_and_broken_sql() {
    let graph = sample_graph(false);
    let generated = Generator::new(Dialect::PostgreSQL).generate(&graph).sql;

    let broken = [
        generated.as_str(),
        "CREATE TABLE customer orders (id uuid)",
        "CREATE TABLE a (\n\tid INTEGER,,\n\tname TEXT,\n)\nCREATE TABLE b (id INTEGER)",
        "CREATE TABLE t (\n\tid INTEGER\n",
    ];
    for case in broken {
        let once = repair(case);
        assert_eq!(repair(&once), once, "repair not idempotent for {case:?}");
    }
}

#[test]
fn repaired_generated_sql_still_parses_identically() {
    // repair is only meant for hand-edited text, but it must not corrupt
    // well-formed generator output either
    let graph = sample_graph(false);
    let generated = Generator::new(Dialect::PostgreSQL).generate(&graph).sql;
    let reparsed = parse(&repair(&generated)).unwrap();
    assert_isomorphic(&graph, &reparsed);
}

#[test]
fn inline_mode_keeps_create_table_self_contained() {
    // users(id uuid primary, email varchar unique) with inline
    // constraints: one CREATE TABLE, both constraints inline, no trailing
    // ALTER section
    let mut graph = SchemaGraph::new();
    graph.settings.use_inline_constraints = true;
    graph.tables.push(
        Table::new("users")
            .with_column(Column::new("id", ColumnType::Uuid).with_constraint(Constraint::Primary))
            .with_column(
                Column::new("email", ColumnType::Varchar).with_constraint(Constraint::Unique),
            ),
    );

    let out = Generator::new(Dialect::PostgreSQL).generate(&graph);
    assert_eq!(out.sql.matches("CREATE TABLE").count(), 1);
    assert!(out.sql.contains("id UUID PRIMARY KEY"));
    assert!(out.sql.contains("email VARCHAR(255) UNIQUE"));
    assert!(!out.sql.contains("ALTER TABLE"));
}

#[test]
fn duplicate_alter_statements_yield_one_edge() {
    let sql = "CREATE TABLE orders (id uuid PRIMARY KEY); \
               ALTER TABLE orders ADD CONSTRAINT fk1 FOREIGN KEY (id) REFERENCES users(id); \
               ALTER TABLE orders ADD CONSTRAINT fk1 FOREIGN KEY (id) REFERENCES users(id);";
    let graph = parse(&repair(sql)).unwrap();
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].constraint_name, "fk1");
    // the dangling target survives parsing; generation is where it gets
    // dropped with a warning
    let out = Generator::new(Dialect::PostgreSQL).generate(&graph);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn dedup_inside_marker_section_is_textual() {
    let graph = sample_graph(false);
    let generated = Generator::new(Dialect::PostgreSQL).generate(&graph).sql;

    // duplicate the single ALTER line inside the marker section
    let alter = generated
        .lines()
        .find(|l| l.starts_with("ALTER TABLE"))
        .unwrap()
        .to_string();
    let doubled = format!("{generated}{alter}\n");

    let repaired = repair(&doubled);
    assert_eq!(
        repaired.matches("ADD CONSTRAINT fk_orders_user_id").count(),
        1
    );

    let parsed = parse(&repaired).unwrap();
    assert_eq!(parsed.edges.len(), 1);
}

#[test]
fn settings_do_not_leak_through_parse() {
    // parse always yields default settings; they are carried by the
    // reconciling caller, not the text
    let mut graph = sample_graph(false);
    graph.settings.case_sensitive_identifiers = true;
    let out = Generator::new(Dialect::PostgreSQL).generate(&graph);
    let parsed = parse(&out.sql).unwrap();
    assert_eq!(parsed.settings, GraphSettings::default());
}
