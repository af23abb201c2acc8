//! DDL parser
//!
//! Turns SQL text (usually pre-processed by [`crate::repair`]) into a
//! fresh [`SchemaGraph`]. Parsing is pure and atomic: the result is either
//! a complete graph or a [`SqlParseError`]; no external state is touched
//! on failure.
//!
//! Only schema-defining statements are extracted: `CREATE TYPE .. AS
//! ENUM`, `CREATE TABLE`, `ALTER TABLE .. ADD [CONSTRAINT ..] FOREIGN
//! KEY`, and `CREATE [UNIQUE] INDEX`. Everything else (views, DML,
//! unsupported ALTER forms) is skipped, not an error. Every table, column,
//! and edge in the output carries a freshly generated id; matching against
//! a previous graph is the reconciler's job.

mod combinators;

use std::collections::HashSet;

use heck::ToSnakeCase;

use canvasql_types::{
    Column, ColumnType, Constraint, EnumType, ForeignKeyEdge, ReferentialAction, SchemaGraph,
    Table,
};

use crate::error::SqlParseError;
use crate::typemap;

use combinators::{
    Ident, ident, kw, kw2, paren_group, split_top_level, string_literal, type_token, word, ws1,
};

// =============================================================================
// Entry point
// =============================================================================

/// Parse SQL text into a schema graph.
///
/// # Errors
///
/// Fails with [`SqlParseError`] when a recognized statement is
/// structurally invalid or a column type token is outside the supported
/// vocabulary (and not a declared enum name).
pub fn parse(sql: &str) -> Result<SchemaGraph, SqlParseError> {
    let statements = split_statements(sql);

    let mut enum_decls = Vec::new();
    let mut table_decls = Vec::new();
    let mut alter_decls = Vec::new();
    let mut index_decls = Vec::new();

    for stmt in &statements {
        match classify(&stmt.text) {
            Kind::EnumType => enum_decls.push(parse_create_type(&stmt.text, stmt.line)?),
            Kind::Table => table_decls.push(parse_create_table(&stmt.text, stmt.line)?),
            Kind::AlterFk => alter_decls.push(parse_alter_fk(&stmt.text, stmt.line)?),
            Kind::Index => index_decls.push(parse_create_index(&stmt.text, stmt.line)?),
            Kind::Other => {}
        }
    }

    assemble(enum_decls, table_decls, alter_decls, index_decls)
}

// =============================================================================
// Statement splitting
// =============================================================================

struct RawStatement {
    text: String,
    line: usize,
}

/// Split input on `;` outside quotes, stripping `--` comments and
/// recording the line each statement starts on
fn split_statements(sql: &str) -> Vec<RawStatement> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut start_line = None;
    let mut line = 1usize;
    let mut quote: Option<char> = None;

    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    if start_line.is_none() {
                        start_line = Some(line);
                    }
                    current.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                ';' => {
                    let text = current.trim();
                    if !text.is_empty() {
                        statements.push(RawStatement {
                            text: text.to_string(),
                            line: start_line.unwrap_or(line),
                        });
                    }
                    current.clear();
                    start_line = None;
                }
                _ => {
                    if start_line.is_none() && !c.is_whitespace() {
                        start_line = Some(line);
                    }
                    current.push(c);
                }
            },
        }
    }
    let text = current.trim();
    if !text.is_empty() {
        statements.push(RawStatement {
            text: text.to_string(),
            line: start_line.unwrap_or(line),
        });
    }
    statements
}

enum Kind {
    EnumType,
    Table,
    AlterFk,
    Index,
    Other,
}

fn classify(text: &str) -> Kind {
    let upper = text.to_uppercase();
    let squashed = upper.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut words = upper.split_whitespace();
    let first = words.next().unwrap_or_default();
    let second = words.next().unwrap_or_default();
    let third = words.next().unwrap_or_default();

    match (first, second) {
        ("CREATE", "TYPE") if squashed.contains("AS ENUM") => Kind::EnumType,
        ("CREATE", "TABLE") => Kind::Table,
        ("CREATE", "INDEX") => Kind::Index,
        ("CREATE", "UNIQUE") if third == "INDEX" => Kind::Index,
        ("ALTER", "TABLE") if squashed.contains("FOREIGN KEY") => Kind::AlterFk,
        _ => Kind::Other,
    }
}

// =============================================================================
// Statement declarations
// =============================================================================

struct EnumDecl {
    name: Ident,
    values: Vec<String>,
}

struct TableDecl {
    name: Ident,
    line: usize,
    columns: Vec<ColumnDecl>,
    clauses: Vec<TableClause>,
}

struct ColumnDecl {
    name: Ident,
    ty: TypeDecl,
    not_null: bool,
    unique: bool,
    primary: bool,
    references: Vec<NamedRef>,
}

/// A column-level `[CONSTRAINT name] REFERENCES ..` clause
struct NamedRef {
    name: Option<String>,
    target: RefClause,
}

enum TypeDecl {
    Token(String),
    InlineEnum(Vec<String>),
}

struct RefClause {
    table: Ident,
    columns: Vec<Ident>,
    on_delete: Option<ReferentialAction>,
    on_update: Option<ReferentialAction>,
}

enum TableClause {
    PrimaryKey(Vec<Ident>),
    Unique(Vec<Ident>),
    Key(Vec<Ident>),
    Fk(FkClause),
    Skip,
}

struct FkClause {
    name: Option<Ident>,
    columns: Vec<Ident>,
    target: RefClause,
}

struct AlterFkDecl {
    table: Ident,
    fk: FkClause,
}

struct IndexDecl {
    unique: bool,
    table: Ident,
    columns: Vec<Ident>,
}

// =============================================================================
// Statement parsers
// =============================================================================

type IResult<'a, T> = nom::IResult<&'a str, T>;

fn expect<'a, T>(
    result: IResult<'a, T>,
    what: &str,
    line: usize,
) -> Result<(&'a str, T), SqlParseError> {
    result.map_err(|_| SqlParseError::at_line(format!("expected {what}"), line))
}

fn skip_ws(input: &str) -> &str {
    input.trim_start()
}

fn snippet(input: &str) -> &str {
    let trimmed = input.trim();
    let end = trimmed
        .char_indices()
        .nth(24)
        .map_or(trimmed.len(), |(idx, _)| idx);
    &trimmed[..end]
}

fn parse_create_type(text: &str, line: usize) -> Result<EnumDecl, SqlParseError> {
    let (rest, _) = expect(kw2("CREATE", "TYPE")(text), "CREATE TYPE", line)?;
    let (rest, _) = expect(ws1(rest), "type name", line)?;
    let (rest, name) = expect(ident(rest), "type name", line)?;
    let (rest, _) = expect(ws1(rest), "AS ENUM", line)?;
    let (rest, _) = expect(kw("AS")(rest), "AS ENUM", line)?;
    let (rest, _) = expect(ws1(rest), "AS ENUM", line)?;
    let (rest, _) = expect(kw("ENUM")(rest), "AS ENUM", line)?;
    let rest = skip_ws(rest);
    let (_, inner) = expect(paren_group(rest), "enum value list", line)?;

    let mut values = Vec::new();
    for part in split_top_level(inner) {
        values.push(parse_enum_value(part).ok_or_else(|| {
            SqlParseError::at_line(format!("invalid enum value `{part}`"), line)
        })?);
    }
    Ok(EnumDecl { name, values })
}

/// Enum values may be single-quoted, double-quoted, or bare
fn parse_enum_value(part: &str) -> Option<String> {
    if part.starts_with('\'') {
        let (rest, value) = string_literal(part).ok()?;
        return rest.trim().is_empty().then_some(value);
    }
    if part.starts_with('"') {
        let (rest, id) = ident(part).ok()?;
        return rest.trim().is_empty().then_some(id.name);
    }
    let (rest, bare) = word(part).ok()?;
    rest.trim().is_empty().then(|| bare.to_string())
}

fn parse_create_table(text: &str, line: usize) -> Result<TableDecl, SqlParseError> {
    let (rest, _) = expect(kw2("CREATE", "TABLE")(text), "CREATE TABLE", line)?;
    let (rest, _) = expect(ws1(rest), "table name", line)?;
    let rest = match kw("IF")(rest) {
        Ok((r, _)) => {
            let (r, _) = expect(ws1(r), "IF NOT EXISTS", line)?;
            let (r, _) = expect(kw("NOT")(r), "IF NOT EXISTS", line)?;
            let (r, _) = expect(ws1(r), "IF NOT EXISTS", line)?;
            let (r, _) = expect(kw("EXISTS")(r), "IF NOT EXISTS", line)?;
            let (r, _) = expect(ws1(r), "table name", line)?;
            r
        }
        Err(_) => rest,
    };
    let (rest, name) = expect(ident(rest), "table name", line)?;
    let rest = skip_ws(rest);
    // trailing clauses after the close paren (WITHOUT ROWID, engine
    // options) are ignored
    let (_, body) = expect(paren_group(rest), "column list", line)?;

    let mut columns = Vec::new();
    let mut clauses = Vec::new();
    for clause in split_top_level(body) {
        if let Some(table_clause) = parse_table_clause(clause, line)? {
            clauses.push(table_clause);
        } else {
            columns.push(parse_column_clause(clause, line)?);
        }
    }

    Ok(TableDecl {
        name,
        line,
        columns,
        clauses,
    })
}

/// Parse a table-level clause, or return `None` when the clause is a
/// column definition
fn parse_table_clause(
    clause: &str,
    line: usize,
) -> Result<Option<TableClause>, SqlParseError> {
    let Ok((_, head)) = word(clause) else {
        return Ok(None); // starts with a quote: column definition
    };

    let parsed = match head.to_uppercase().as_str() {
        "PRIMARY" => {
            let (rest, _) = expect(kw2("PRIMARY", "KEY")(clause), "PRIMARY KEY", line)?;
            let (_, inner) = expect(paren_group(skip_ws(rest)), "primary key columns", line)?;
            TableClause::PrimaryKey(ident_list(inner, line)?)
        }
        "UNIQUE" => {
            let (rest, _) = expect(kw("UNIQUE")(clause), "UNIQUE", line)?;
            let rest = skip_optional_index_words(rest);
            let (_, inner) = expect(paren_group(rest), "unique columns", line)?;
            TableClause::Unique(ident_list(inner, line)?)
        }
        "KEY" | "INDEX" => {
            let (rest, _) = expect(word(clause), "KEY", line)?;
            let rest = skip_optional_index_words(rest);
            let (_, inner) = expect(paren_group(rest), "index columns", line)?;
            TableClause::Key(ident_list(inner, line)?)
        }
        "FOREIGN" => TableClause::Fk(parse_fk_clause(clause, None, line)?),
        "CONSTRAINT" => {
            let (rest, _) = expect(kw("CONSTRAINT")(clause), "CONSTRAINT", line)?;
            let (rest, _) = expect(ws1(rest), "constraint name", line)?;
            let (rest, name) = expect(ident(rest), "constraint name", line)?;
            let rest = skip_ws(rest);
            let (_, inner_head) = expect(word(rest), "constraint body", line)?;
            match inner_head.to_uppercase().as_str() {
                "FOREIGN" => TableClause::Fk(parse_fk_clause(rest, Some(name), line)?),
                "PRIMARY" => {
                    let (r, _) = expect(kw2("PRIMARY", "KEY")(rest), "PRIMARY KEY", line)?;
                    let (_, inner) =
                        expect(paren_group(skip_ws(r)), "primary key columns", line)?;
                    TableClause::PrimaryKey(ident_list(inner, line)?)
                }
                "UNIQUE" => {
                    let (r, _) = expect(kw("UNIQUE")(rest), "UNIQUE", line)?;
                    let (_, inner) = expect(paren_group(skip_ws(r)), "unique columns", line)?;
                    TableClause::Unique(ident_list(inner, line)?)
                }
                "CHECK" => TableClause::Skip,
                other => {
                    return Err(SqlParseError::at_line(
                        format!("unsupported constraint body `{other}`"),
                        line,
                    ));
                }
            }
        }
        "CHECK" => TableClause::Skip,
        _ => return Ok(None),
    };
    Ok(Some(parsed))
}

/// Skip an optional index/key name (and MySQL's optional USING hint)
fn skip_optional_index_words(input: &str) -> &str {
    let mut rest = skip_ws(input);
    while !rest.starts_with('(') {
        match word(rest) {
            Ok((r, _)) => rest = skip_ws(r),
            Err(_) => break,
        }
    }
    rest
}

/// Parse `FOREIGN KEY (cols) REFERENCES table [(cols)] [actions]`
fn parse_fk_clause(
    input: &str,
    name: Option<Ident>,
    line: usize,
) -> Result<FkClause, SqlParseError> {
    let (rest, _) = expect(kw2("FOREIGN", "KEY")(input), "FOREIGN KEY", line)?;
    let (rest, inner) = expect(paren_group(skip_ws(rest)), "foreign key columns", line)?;
    let columns = ident_list(inner, line)?;
    let rest = skip_ws(rest);
    let (rest, _) = expect(kw("REFERENCES")(rest), "REFERENCES", line)?;
    let (_, target) = parse_references(skip_ws(rest), line)?;
    Ok(FkClause {
        name,
        columns,
        target,
    })
}

/// Parse the target of a `REFERENCES` clause: table, optional column
/// list, optional referential actions
fn parse_references<'a>(
    input: &'a str,
    line: usize,
) -> Result<(&'a str, RefClause), SqlParseError> {
    let (rest, table) = expect(ident(input), "referenced table", line)?;
    let mut rest = skip_ws(rest);
    let mut columns = Vec::new();
    if rest.starts_with('(') {
        let (r, inner) = expect(paren_group(rest), "referenced columns", line)?;
        columns = ident_list(inner, line)?;
        rest = r;
    }

    let mut on_delete = None;
    let mut on_update = None;
    loop {
        let trimmed = skip_ws(rest);
        let Ok((r, _)) = kw("ON")(trimmed) else {
            rest = trimmed;
            break;
        };
        let r = skip_ws(r);
        let (r, is_delete) = if let Ok((r, _)) = kw("DELETE")(r) {
            (r, true)
        } else {
            let (r, _) = expect(kw("UPDATE")(r), "DELETE or UPDATE", line)?;
            (r, false)
        };
        let (r, action) = parse_action(skip_ws(r), line)?;
        if is_delete {
            on_delete = Some(action);
        } else {
            on_update = Some(action);
        }
        rest = r;
    }

    Ok((
        rest,
        RefClause {
            table,
            columns,
            on_delete,
            on_update,
        },
    ))
}

fn parse_action<'a>(
    input: &'a str,
    line: usize,
) -> Result<(&'a str, ReferentialAction), SqlParseError> {
    if let Ok((r, _)) = kw2("NO", "ACTION")(input) {
        return Ok((r, ReferentialAction::NoAction));
    }
    if let Ok((r, _)) = kw2("SET", "NULL")(input) {
        return Ok((r, ReferentialAction::SetNull));
    }
    if let Ok((r, _)) = kw2("SET", "DEFAULT")(input) {
        return Ok((r, ReferentialAction::SetDefault));
    }
    if let Ok((r, _)) = kw("CASCADE")(input) {
        return Ok((r, ReferentialAction::Cascade));
    }
    if let Ok((r, _)) = kw("RESTRICT")(input) {
        return Ok((r, ReferentialAction::Restrict));
    }
    Err(SqlParseError::at_line(
        format!("unknown referential action near `{}`", snippet(input)),
        line,
    ))
}

fn ident_list(inner: &str, line: usize) -> Result<Vec<Ident>, SqlParseError> {
    let mut idents = Vec::new();
    for part in split_top_level(inner) {
        let (rest, id) = expect(ident(part), "identifier", line)?;
        if !rest.trim().is_empty() {
            return Err(SqlParseError::at_line(
                format!("unexpected `{}` after identifier `{}`", snippet(rest), id.name),
                line,
            ));
        }
        idents.push(id);
    }
    Ok(idents)
}

fn parse_column_clause(clause: &str, line: usize) -> Result<ColumnDecl, SqlParseError> {
    let (rest, name) = expect(ident(clause), "column name", line)?;
    let (rest, _) = expect(
        ws1(rest),
        &format!("type for column `{}`", name.name),
        line,
    )?;

    // Type: quoted identifier (enum reference), inline MySQL ENUM(..), or
    // a plain type token
    let (mut rest, ty) = if rest.starts_with('"') || rest.starts_with('`') {
        let (r, id) = expect(ident(rest), "column type", line)?;
        (r, TypeDecl::Token(id.name))
    } else if let Ok((r, _)) = kw("ENUM")(rest) {
        let r = skip_ws(r);
        let (r, inner) = expect(paren_group(r), "enum values", line)?;
        let mut values = Vec::new();
        for part in split_top_level(inner) {
            values.push(parse_enum_value(part).ok_or_else(|| {
                SqlParseError::at_line(format!("invalid enum value `{part}`"), line)
            })?);
        }
        (r, TypeDecl::InlineEnum(values))
    } else {
        let (r, token) = expect(
            type_token(rest),
            &format!("type for column `{}`", name.name),
            line,
        )?;
        (r, TypeDecl::Token(token))
    };

    let mut decl = ColumnDecl {
        name,
        ty,
        not_null: false,
        unique: false,
        primary: false,
        references: Vec::new(),
    };
    let mut pending_name: Option<String> = None;

    loop {
        rest = skip_ws(rest);
        if rest.is_empty() {
            break;
        }
        if let Ok((r, _)) = kw2("NOT", "NULL")(rest) {
            decl.not_null = true;
            rest = r;
        } else if let Ok((r, _)) = kw("NULL")(rest) {
            rest = r;
        } else if let Ok((r, _)) = kw2("PRIMARY", "KEY")(rest) {
            decl.primary = true;
            rest = r;
        } else if let Ok((r, _)) = kw("PRIMARY")(rest) {
            decl.primary = true;
            rest = r;
        } else if let Ok((r, _)) = kw("UNIQUE")(rest) {
            decl.unique = true;
            rest = r;
        } else if let Ok((r, _)) = kw("AUTO_INCREMENT")(rest) {
            rest = r;
        } else if let Ok((r, _)) = kw("AUTOINCREMENT")(rest) {
            rest = r;
        } else if let Ok((r, _)) = kw("DEFAULT")(rest) {
            rest = consume_default(skip_ws(r), line)?;
        } else if let Ok((r, _)) = kw("CHECK")(rest) {
            let (r, _) = expect(paren_group(skip_ws(r)), "check expression", line)?;
            rest = r;
        } else if let Ok((r, _)) = kw("COLLATE")(rest) {
            let (r, _) = expect(word(skip_ws(r)), "collation name", line)?;
            rest = r;
        } else if let Ok((r, _)) = kw("CONSTRAINT")(rest) {
            let (r, _) = expect(ws1(r), "constraint name", line)?;
            let (r, name) = expect(ident(r), "constraint name", line)?;
            pending_name = Some(name.name);
            rest = r;
        } else if let Ok((r, _)) = kw("REFERENCES")(rest) {
            let (r, target) = parse_references(skip_ws(r), line)?;
            decl.references.push(NamedRef {
                name: pending_name.take(),
                target,
            });
            rest = r;
        } else {
            return Err(SqlParseError::at_line(
                format!(
                    "unexpected `{}` in definition of column `{}`",
                    snippet(rest),
                    decl.name.name
                ),
                line,
            ));
        }
    }

    Ok(decl)
}

/// Consume a DEFAULT value: a string literal, a parenthesized expression,
/// or a single bare token. The value itself is discarded.
fn consume_default(input: &str, line: usize) -> Result<&str, SqlParseError> {
    if input.starts_with('\'') {
        let (rest, _) = expect(string_literal(input), "default literal", line)?;
        return Ok(rest);
    }
    if input.starts_with('(') {
        let (rest, _) = expect(paren_group(input), "default expression", line)?;
        return Ok(rest);
    }
    if input.starts_with('"') || input.starts_with('`') {
        let (rest, _) = expect(ident(input), "default value", line)?;
        return Ok(rest);
    }
    let end = input
        .find(char::is_whitespace)
        .unwrap_or(input.len());
    if end == 0 {
        return Err(SqlParseError::at_line("expected default value", line));
    }
    Ok(&input[end..])
}

fn parse_alter_fk(text: &str, line: usize) -> Result<AlterFkDecl, SqlParseError> {
    let (rest, _) = expect(kw2("ALTER", "TABLE")(text), "ALTER TABLE", line)?;
    let (rest, _) = expect(ws1(rest), "table name", line)?;
    let (rest, table) = expect(ident(rest), "table name", line)?;
    let (rest, _) = expect(ws1(rest), "ADD", line)?;
    let (rest, _) = expect(kw("ADD")(rest), "ADD", line)?;
    let rest = skip_ws(rest);
    let (rest, name) = match kw("CONSTRAINT")(rest) {
        Ok((r, _)) => {
            let (r, _) = expect(ws1(r), "constraint name", line)?;
            let (r, name) = expect(ident(r), "constraint name", line)?;
            (skip_ws(r), Some(name))
        }
        Err(_) => (rest, None),
    };
    let fk = parse_fk_clause(rest, name, line)?;
    Ok(AlterFkDecl { table, fk })
}

fn parse_create_index(text: &str, line: usize) -> Result<IndexDecl, SqlParseError> {
    let (rest, _) = expect(kw("CREATE")(text), "CREATE INDEX", line)?;
    let rest = skip_ws(rest);
    let (rest, unique) = match kw("UNIQUE")(rest) {
        Ok((r, _)) => (skip_ws(r), true),
        Err(_) => (rest, false),
    };
    let (rest, _) = expect(kw("INDEX")(rest), "INDEX", line)?;
    let (rest, _) = expect(ws1(rest), "index name", line)?;
    let rest = match kw("IF")(rest) {
        Ok((r, _)) => {
            let (r, _) = expect(ws1(r), "IF NOT EXISTS", line)?;
            let (r, _) = expect(kw("NOT")(r), "IF NOT EXISTS", line)?;
            let (r, _) = expect(ws1(r), "IF NOT EXISTS", line)?;
            let (r, _) = expect(kw("EXISTS")(r), "IF NOT EXISTS", line)?;
            let (r, _) = expect(ws1(r), "index name", line)?;
            r
        }
        Err(_) => rest,
    };
    let (rest, _name) = expect(ident(rest), "index name", line)?;
    let (rest, _) = expect(ws1(rest), "ON", line)?;
    let (rest, _) = expect(kw("ON")(rest), "ON", line)?;
    let (rest, _) = expect(ws1(rest), "table name", line)?;
    let (rest, table) = expect(ident(rest), "table name", line)?;
    // a USING hint may precede the column list; WHERE and the like after
    // it are ignored
    let (_, inner) = expect(
        paren_group(skip_optional_index_words(rest)),
        "index columns",
        line,
    )?;
    let columns = ident_list(inner, line)?;
    Ok(IndexDecl {
        unique,
        table,
        columns,
    })
}

// =============================================================================
// Graph assembly
// =============================================================================

/// One foreign key waiting for endpoint resolution
struct PendingFk {
    /// Table index for CREATE TABLE-origin clauses, or a name for ALTER
    source_table: SourceTable,
    source_column: SourceColumn,
    explicit_name: Option<String>,
    target_table: Ident,
    target_column: Option<Ident>,
    on_delete: Option<ReferentialAction>,
    on_update: Option<ReferentialAction>,
}

#[derive(Clone)]
enum SourceTable {
    Index(usize),
    Named(Ident),
}

enum SourceColumn {
    Index(usize),
    Named(Ident),
}

fn assemble(
    enum_decls: Vec<EnumDecl>,
    table_decls: Vec<TableDecl>,
    alter_decls: Vec<AlterFkDecl>,
    index_decls: Vec<IndexDecl>,
) -> Result<SchemaGraph, SqlParseError> {
    let mut graph = SchemaGraph::new();

    // Enum names are unique; the first declaration wins
    for decl in enum_decls {
        if graph.enum_type(&decl.name.name).is_none() {
            graph.enums.push(EnumType::new(decl.name.name, decl.values));
        }
    }

    // Tables and columns, with duplicate labels/titles disambiguated by
    // numeric suffix before they enter the graph
    for decl in &table_decls {
        let mut label = decl.name.name.clone();
        let mut n = 2;
        while graph
            .tables
            .iter()
            .any(|t| t.label.eq_ignore_ascii_case(&label))
        {
            label = format!("{}_{}", decl.name.name, n);
            n += 1;
        }

        let mut table = Table::new(label);
        for col in &decl.columns {
            let ty = resolve_type(
                &col.ty,
                &table.label,
                &col.name.name,
                &mut graph.enums,
                decl.line,
            )?;
            let mut title = col.name.name.clone();
            let mut n = 2;
            while table.column(&title).is_some() {
                title = format!("{}_{}", col.name.name, n);
                n += 1;
            }
            let mut column = Column::new(title, ty);
            if col.not_null {
                column.add_constraint(Constraint::NotNull);
            }
            if col.unique {
                column.add_constraint(Constraint::Unique);
            }
            if col.primary {
                column.add_constraint(Constraint::Primary);
            }
            table.columns.push(column);
        }
        graph.tables.push(table);
    }

    // Table-level clauses: constraint tags plus pending foreign keys, in
    // declaration order (inline column references first, then table
    // clauses, then ALTER statements)
    let mut pending = Vec::new();
    for (ti, decl) in table_decls.iter().enumerate() {
        for (ci, col) in decl.columns.iter().enumerate() {
            for named in &col.references {
                pending.extend(expand_fk(
                    SourceTable::Index(ti),
                    vec![SourceColumn::Index(ci)],
                    named.name.clone(),
                    &named.target,
                ));
            }
        }
        for clause in &decl.clauses {
            match clause {
                TableClause::PrimaryKey(cols) => {
                    tag_columns(&mut graph.tables[ti], cols, Constraint::Primary);
                }
                TableClause::Unique(cols) => {
                    tag_columns(&mut graph.tables[ti], cols, Constraint::Unique);
                }
                TableClause::Key(cols) => {
                    tag_columns(&mut graph.tables[ti], cols, Constraint::Index);
                }
                TableClause::Fk(fk) => {
                    pending.extend(expand_fk(
                        SourceTable::Index(ti),
                        fk.columns.iter().cloned().map(SourceColumn::Named).collect(),
                        fk.name.as_ref().map(|n| n.name.clone()),
                        &fk.target,
                    ));
                }
                TableClause::Skip => {}
            }
        }
    }
    for decl in &alter_decls {
        pending.extend(expand_fk(
            SourceTable::Named(decl.table.clone()),
            decl.fk
                .columns
                .iter()
                .cloned()
                .map(SourceColumn::Named)
                .collect(),
            decl.fk.name.as_ref().map(|n| n.name.clone()),
            &decl.fk.target,
        ));
    }

    build_edges(&mut graph, pending);

    // Index statements become Index tags; unique indexes also tag Unique
    for decl in &index_decls {
        let Some(ti) = find_table(&graph, &decl.table) else {
            continue;
        };
        for col in &decl.columns {
            if let Some(ci) = find_column(&graph.tables[ti], col) {
                graph.tables[ti].columns[ci].add_constraint(Constraint::Index);
                if decl.unique {
                    graph.tables[ti].columns[ci].add_constraint(Constraint::Unique);
                }
            }
        }
    }

    Ok(graph)
}

/// Zip a (possibly composite) foreign key into single-column pending
/// edges; only the first pair keeps the explicit constraint name
fn expand_fk(
    source_table: SourceTable,
    source_columns: Vec<SourceColumn>,
    explicit_name: Option<String>,
    target: &RefClause,
) -> Vec<PendingFk> {
    source_columns
        .into_iter()
        .enumerate()
        .map(|(i, column)| PendingFk {
            source_table: source_table.clone(),
            source_column: column,
            explicit_name: if i == 0 { explicit_name.clone() } else { None },
            target_table: target.table.clone(),
            target_column: target.columns.get(i).cloned(),
            on_delete: target.on_delete,
            on_update: target.on_update,
        })
        .collect()
}

/// Resolve pending foreign keys into edges.
///
/// Endpoints take the graph's canonical spelling when they resolve and
/// the written spelling otherwise: dangling references survive parsing
/// and are only dropped (with a warning) at generation time. Duplicate
/// constraint names drop the edge, first occurrence wins.
fn build_edges(graph: &mut SchemaGraph, pending: Vec<PendingFk>) {
    let mut used_names: HashSet<String> = HashSet::new();

    for fk in pending {
        let source_idx = match &fk.source_table {
            SourceTable::Index(i) => Some(*i),
            SourceTable::Named(id) => find_table(graph, id),
        };
        let (source_table, source_column, resolved_source) = match source_idx {
            Some(sti) => {
                let sci = match &fk.source_column {
                    SourceColumn::Index(i) => Some(*i),
                    SourceColumn::Named(id) => find_column(&graph.tables[sti], id),
                };
                let label = graph.tables[sti].label.clone();
                match sci {
                    Some(sci) => (
                        label,
                        graph.tables[sti].columns[sci].title.clone(),
                        Some((sti, sci)),
                    ),
                    None => {
                        let SourceColumn::Named(id) = &fk.source_column else {
                            continue;
                        };
                        (label, id.name.clone(), None)
                    }
                }
            }
            None => {
                let SourceTable::Named(table) = &fk.source_table else {
                    continue;
                };
                let SourceColumn::Named(column) = &fk.source_column else {
                    continue;
                };
                (table.name.clone(), column.name.clone(), None)
            }
        };

        let target_idx = find_table(graph, &fk.target_table);
        let (target_table, target_column) = match (&fk.target_column, target_idx) {
            (Some(col), Some(tti)) => {
                let label = graph.tables[tti].label.clone();
                match find_column(&graph.tables[tti], col) {
                    Some(tci) => (label, graph.tables[tti].columns[tci].title.clone()),
                    None => (label, col.name.clone()),
                }
            }
            (Some(col), None) => (fk.target_table.name.clone(), col.name.clone()),
            (None, Some(tti)) => {
                // REFERENCES with no column list targets the primary key
                let Some(tci) = graph.tables[tti]
                    .columns
                    .iter()
                    .position(|c| c.has_constraint(Constraint::Primary))
                else {
                    continue;
                };
                let label = graph.tables[tti].label.clone();
                (label, graph.tables[tti].columns[tci].title.clone())
            }
            (None, None) => continue,
        };

        let name = match fk.explicit_name {
            Some(name) => {
                if !used_names.insert(name.to_lowercase()) {
                    continue; // duplicate constraint name: first wins
                }
                name
            }
            None => {
                let base = format!(
                    "fk_{}_{}",
                    source_table.to_snake_case(),
                    source_column.to_snake_case()
                );
                let mut name = base.clone();
                let mut n = 2;
                while !used_names.insert(name.to_lowercase()) {
                    name = format!("{base}_{n}");
                    n += 1;
                }
                name
            }
        };

        if let Some((sti, sci)) = resolved_source {
            graph.tables[sti].columns[sci].add_constraint(Constraint::ForeignKey);
        }

        let mut edge =
            ForeignKeyEdge::new(name, source_table, source_column, target_table, target_column);
        edge.on_delete = fk.on_delete;
        edge.on_update = fk.on_update;
        graph.edges.push(edge);
    }
}

fn tag_columns(table: &mut Table, cols: &[Ident], tag: Constraint) {
    for id in cols {
        if let Some(ci) = find_column(table, id) {
            table.columns[ci].add_constraint(tag);
        }
    }
}

fn find_table(graph: &SchemaGraph, id: &Ident) -> Option<usize> {
    graph.tables.iter().position(|t| id.matches(&t.label))
}

fn find_column(table: &Table, id: &Ident) -> Option<usize> {
    table.columns.iter().position(|c| id.matches(&c.title))
}

fn resolve_type(
    decl: &TypeDecl,
    table_label: &str,
    column_title: &str,
    enums: &mut Vec<EnumType>,
    line: usize,
) -> Result<ColumnType, SqlParseError> {
    match decl {
        TypeDecl::InlineEnum(values) => {
            // reuse an identical declaration before synthesizing a new one
            if let Some(existing) = enums.iter().find(|e| &e.values == values) {
                return Ok(ColumnType::Enum(existing.name.clone()));
            }
            let base = format!(
                "{}_{}_enum",
                table_label.to_snake_case(),
                column_title.to_snake_case()
            );
            let mut name = base.clone();
            let mut n = 2;
            while enums.iter().any(|e| e.name == name) {
                name = format!("{base}_{n}");
                n += 1;
            }
            enums.push(EnumType::new(name.clone(), values.clone()));
            Ok(ColumnType::Enum(name))
        }
        TypeDecl::Token(token) => {
            if let Some(ty) = typemap::logical_type(token) {
                return Ok(ty);
            }
            if let Some(e) = enums.iter().find(|e| e.name == *token) {
                return Ok(ColumnType::Enum(e.name.clone()));
            }
            if let Some(e) = enums.iter().find(|e| e.name.eq_ignore_ascii_case(token)) {
                return Ok(ColumnType::Enum(e.name.clone()));
            }
            Err(SqlParseError::at_line(
                format!("unrecognized column type `{token}` for column `{column_title}`"),
                line,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let sql = "CREATE TABLE users (\n\
                   \tid UUID PRIMARY KEY,\n\
                   \temail VARCHAR(255) NOT NULL UNIQUE\n\
                   );";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.tables.len(), 1);

        let users = graph.table("users").unwrap();
        assert_eq!(users.columns.len(), 2);
        assert_eq!(users.columns[0].ty, ColumnType::Uuid);
        assert!(users.columns[0].has_constraint(Constraint::Primary));
        assert_eq!(users.columns[1].ty, ColumnType::Varchar);
        assert!(users.columns[1].has_constraint(Constraint::NotNull));
        assert!(users.columns[1].has_constraint(Constraint::Unique));
    }

    #[test]
    fn test_parse_quoted_identifiers() {
        let sql = "CREATE TABLE \"Customer Orders\" (\n\
                   \t\"placed at\" TIMESTAMP NOT NULL\n\
                   );";
        let graph = parse(sql).unwrap();
        let table = graph.table("Customer Orders").unwrap();
        assert_eq!(table.columns[0].title, "placed at");
        assert_eq!(table.columns[0].ty, ColumnType::Timestamp);
    }

    #[test]
    fn test_parse_alter_table_fk() {
        let sql = "CREATE TABLE users (id UUID PRIMARY KEY);\n\
                   CREATE TABLE orders (id UUID PRIMARY KEY, user_id UUID);\n\
                   ALTER TABLE orders ADD CONSTRAINT fk_orders_user FOREIGN KEY (user_id) \
                   REFERENCES users (id) ON DELETE CASCADE ON UPDATE RESTRICT;";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.edges.len(), 1);

        let edge = &graph.edges[0];
        assert_eq!(edge.constraint_name, "fk_orders_user");
        assert_eq!(edge.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(edge.on_update, Some(ReferentialAction::Restrict));
        assert_eq!(edge.source_table, "orders");
        assert_eq!(edge.source_column, "user_id");
        assert_eq!(edge.target_table, "users");
        assert_eq!(edge.target_column, "id");

        let (_, column) = graph.endpoint(&edge.source_table, &edge.source_column).unwrap();
        assert!(column.has_constraint(Constraint::ForeignKey));
    }

    #[test]
    fn test_parse_inline_references() {
        let sql = "CREATE TABLE users (id UUID PRIMARY KEY);\n\
                   CREATE TABLE posts (author_id UUID REFERENCES users (id) ON DELETE SET NULL);";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].on_delete, Some(ReferentialAction::SetNull));
        assert_eq!(graph.edges[0].constraint_name, "fk_posts_author_id");
    }

    #[test]
    fn test_parse_references_without_column_targets_primary_key() {
        let sql = "CREATE TABLE users (id UUID PRIMARY KEY, email TEXT);\n\
                   CREATE TABLE posts (author_id UUID REFERENCES users);";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].target_column, "id");
    }

    #[test]
    fn test_parse_create_type() {
        let sql = "CREATE TYPE status AS ENUM ('active', 'inactive');\n\
                   CREATE TABLE jobs (state status);";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.enums.len(), 1);
        assert_eq!(graph.enums[0].values, vec!["active", "inactive"]);
        assert_eq!(
            graph.table("jobs").unwrap().columns[0].ty,
            ColumnType::Enum("status".to_string())
        );
    }

    #[test]
    fn test_parse_create_type_double_quoted_values() {
        let sql = "CREATE TYPE status AS ENUM (\"active\", \"inactive\");";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.enums[0].values, vec!["active", "inactive"]);
    }

    #[test]
    fn test_parse_mysql_inline_enum() {
        let sql = "CREATE TABLE `jobs` (\n\
                   \t`state` ENUM('queued', 'done') NOT NULL\n\
                   );";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.enums.len(), 1);
        assert_eq!(graph.enums[0].name, "jobs_state_enum");
        assert_eq!(graph.enums[0].values, vec!["queued", "done"]);
        assert_eq!(
            graph.table("jobs").unwrap().columns[0].ty,
            ColumnType::Enum("jobs_state_enum".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_type_fails_hard() {
        let sql = "CREATE TABLE files (\n\tdata BLOB\n);";
        let err = parse(sql).unwrap_err();
        assert!(err.message.contains("unrecognized column type `BLOB`"), "{err}");
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_parse_skips_unrecognized_statements() {
        let sql = "DROP TABLE old_stuff;\n\
                   SELECT * FROM users;\n\
                   CREATE VIEW v AS SELECT 1;\n\
                   ALTER TABLE users DROP COLUMN legacy;\n\
                   CREATE TABLE users (id UUID PRIMARY KEY);";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.tables.len(), 1);
        assert!(graph.table("users").is_some());
    }

    #[test]
    fn test_parse_case_insensitive_matching_for_bare_idents() {
        let sql = "CREATE TABLE Users (ID UUID PRIMARY KEY);\n\
                   ALTER TABLE users ADD CONSTRAINT fk1 FOREIGN KEY (id) REFERENCES USERS (id);";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_parse_exact_matching_for_double_quoted_idents() {
        let sql = "CREATE TABLE \"Users\" (id UUID PRIMARY KEY);\n\
                   CREATE TABLE posts (uid UUID);\n\
                   ALTER TABLE posts ADD CONSTRAINT fk1 FOREIGN KEY (uid) REFERENCES \"users\" (id);";
        let graph = parse(sql).unwrap();
        // "users" does not match "Users" exactly: the edge keeps the
        // written spelling instead of adopting the table's
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].target_table, "users");
    }

    #[test]
    fn test_parse_keeps_dangling_foreign_keys() {
        // the referenced table is never created; the edge still survives
        // (generation is where dangling references are dropped)
        let sql = "CREATE TABLE orders (id UUID PRIMARY KEY);\n\
                   ALTER TABLE orders ADD CONSTRAINT fk1 FOREIGN KEY (id) REFERENCES users(id);";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].target_table, "users");
    }

    #[test]
    fn test_parse_duplicate_constraint_names_dropped() {
        let sql = "CREATE TABLE users (id UUID PRIMARY KEY);\n\
                   CREATE TABLE orders (id UUID PRIMARY KEY, a UUID, b UUID);\n\
                   ALTER TABLE orders ADD CONSTRAINT fk1 FOREIGN KEY (a) REFERENCES users (id);\n\
                   ALTER TABLE orders ADD CONSTRAINT fk1 FOREIGN KEY (b) REFERENCES users (id);";
        let graph = parse(sql).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source_column, "a");
    }

    #[test]
    fn test_parse_duplicate_column_titles_suffixed() {
        let sql = "CREATE TABLE t (name TEXT, name TEXT, name TEXT);";
        let graph = parse(sql).unwrap();
        let titles: Vec<_> = graph.tables[0]
            .columns
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["name", "name_2", "name_3"]);
    }

    #[test]
    fn test_parse_table_level_clauses() {
        let sql = "CREATE TABLE t (\n\
                   \ta INTEGER,\n\
                   \tb INTEGER,\n\
                   \tPRIMARY KEY (a),\n\
                   \tUNIQUE (b),\n\
                   \tKEY idx_b (b),\n\
                   \tCHECK (a > 0)\n\
                   );";
        let graph = parse(sql).unwrap();
        let t = graph.table("t").unwrap();
        assert!(t.column("a").unwrap().has_constraint(Constraint::Primary));
        assert!(t.column("b").unwrap().has_constraint(Constraint::Unique));
        assert!(t.column("b").unwrap().has_constraint(Constraint::Index));
    }

    #[test]
    fn test_parse_create_index() {
        let sql = "CREATE TABLE t (a INTEGER, b INTEGER);\n\
                   CREATE INDEX idx_t_a ON t (a);\n\
                   CREATE UNIQUE INDEX idx_t_b ON t (b);";
        let graph = parse(sql).unwrap();
        let t = graph.table("t").unwrap();
        assert!(t.column("a").unwrap().has_constraint(Constraint::Index));
        assert!(!t.column("a").unwrap().has_constraint(Constraint::Unique));
        assert!(t.column("b").unwrap().has_constraint(Constraint::Index));
        assert!(t.column("b").unwrap().has_constraint(Constraint::Unique));
    }

    #[test]
    fn test_parse_defaults_and_checks_discarded() {
        let sql = "CREATE TABLE t (\n\
                   \ta INTEGER DEFAULT 42,\n\
                   \tb TEXT DEFAULT 'it''s fine' NOT NULL,\n\
                   \tc TIMESTAMP DEFAULT now() CHECK (c > '2000-01-01')\n\
                   );";
        let graph = parse(sql).unwrap();
        let t = graph.table("t").unwrap();
        assert_eq!(t.columns.len(), 3);
        assert!(t.column("b").unwrap().has_constraint(Constraint::NotNull));
    }

    #[test]
    fn test_parse_error_carries_line() {
        let sql = "CREATE TABLE ok (id UUID);\n\n\
                   CREATE TABLE broken (id WIDGET);";
        let err = parse(sql).unwrap_err();
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn test_parse_empty_input() {
        let graph = parse("").unwrap();
        assert!(graph.is_empty());

        let graph = parse("-- nothing but comments\n").unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_parse_malformed_recognized_statement_fails() {
        let err = parse("CREATE TABLE missing_parens id UUID;").unwrap_err();
        assert!(err.message.contains("column list"), "{err}");
    }

    #[test]
    fn test_fresh_ids_on_every_parse() {
        let sql = "CREATE TABLE users (id UUID PRIMARY KEY);";
        let a = parse(sql).unwrap();
        let b = parse(sql).unwrap();
        assert_ne!(a.tables[0].id, b.tables[0].id);
        assert_ne!(a.tables[0].columns[0].id, b.tables[0].columns[0].id);
    }
}
