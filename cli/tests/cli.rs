//! Integration tests for the canvasql binary

use assert_cmd::Command;
use predicates::prelude::*;

const GRAPH_JSON: &str = r#"{
  "tables": [
    {
      "label": "users",
      "columns": [
        { "title": "id", "type": "uuid", "constraints": ["primary"] },
        { "title": "email", "type": "varchar", "constraints": ["unique"] }
      ]
    },
    {
      "label": "orders",
      "columns": [
        { "title": "id", "type": "uuid", "constraints": ["primary"] },
        { "title": "user_id", "type": "uuid", "constraints": ["foreignKey"] }
      ]
    }
  ],
  "edges": [
    {
      "constraintName": "fk_orders_user_id",
      "sourceTable": "orders",
      "sourceColumn": "user_id",
      "targetTable": "users",
      "targetColumn": "id",
      "onDelete": "cascade"
    }
  ]
}"#;

fn canvasql() -> Command {
    Command::cargo_bin("canvasql").expect("binary builds")
}

#[test]
fn generate_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("graph.json");
    std::fs::write(&graph_path, GRAPH_JSON).unwrap();

    canvasql()
        .args(["generate", "--stdout"])
        .arg(&graph_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE users ("))
        .stdout(predicate::str::contains("-- foreign key constraints"))
        .stdout(predicate::str::contains(
            "ALTER TABLE orders ADD CONSTRAINT fk_orders_user_id",
        ));
}

#[test]
fn generate_writes_default_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = dir.path().join("graph.json");
    std::fs::write(&graph_path, GRAPH_JSON).unwrap();

    canvasql()
        .current_dir(dir.path())
        .arg("generate")
        .arg(&graph_path)
        .assert()
        .success();

    let written: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".sql"))
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("schema_postgresql_"), "{written:?}");
}

#[test]
fn parse_sql_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let sql_path = dir.path().join("schema.sql");
    std::fs::write(
        &sql_path,
        "CREATE TABLE users (id UUID PRIMARY KEY, email VARCHAR(255) UNIQUE);\n",
    )
    .unwrap();

    canvasql()
        .arg("parse")
        .arg(&sql_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"users\""))
        .stdout(predicate::str::contains("\"type\": \"varchar\""));
}

#[test]
fn parse_repairs_before_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let sql_path = dir.path().join("schema.sql");
    // missing terminator and a bare two-word table name
    std::fs::write(&sql_path, "CREATE TABLE customer orders (id UUID)").unwrap();

    canvasql()
        .arg("parse")
        .arg(&sql_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("customer orders"));
}

#[test]
fn parse_unknown_type_fails() {
    let dir = tempfile::tempdir().unwrap();
    let sql_path = dir.path().join("schema.sql");
    std::fs::write(&sql_path, "CREATE TABLE files (data BLOB);\n").unwrap();

    canvasql()
        .arg("parse")
        .arg(&sql_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized column type"));
}

#[test]
fn convert_postgresql_to_mysql() {
    let dir = tempfile::tempdir().unwrap();
    let sql_path = dir.path().join("schema.sql");
    std::fs::write(
        &sql_path,
        "CREATE TABLE users (id UUID PRIMARY KEY, active BOOLEAN NOT NULL);\n",
    )
    .unwrap();

    canvasql()
        .args(["convert", "--to", "mysql"])
        .arg(&sql_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("id CHAR(36) PRIMARY KEY"))
        .stdout(predicate::str::contains("active TINYINT(1) NOT NULL"));
}

#[test]
fn check_reports_issues_but_still_parses() {
    let dir = tempfile::tempdir().unwrap();
    let sql_path = dir.path().join("schema.sql");
    std::fs::write(&sql_path, "CREATE TABLE t (\n\tid INTEGER\n").unwrap();

    canvasql()
        .arg("check")
        .arg(&sql_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("unclosed paren"))
        .stdout(predicate::str::contains("repair would modify"))
        .stdout(predicate::str::contains("1 table(s)"));
}

#[test]
fn unknown_dialect_is_rejected() {
    canvasql()
        .args(["convert", "--to", "oracle", "whatever.sql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown dialect"));
}
