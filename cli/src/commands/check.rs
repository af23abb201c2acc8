//! Check command: validate and trial-parse SQL DDL

use std::path::PathBuf;

use canvasql_sync::{parse, repair, validate_sql_syntax};

use crate::commands::read_file;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub input: PathBuf,
}

/// Run the check command: report advisory validation issues, whether
/// repair would change the text, and whether the result parses
pub fn run(opts: CheckOptions) -> Result<(), CliError> {
    let sql = read_file(&opts.input)?;

    println!("{}", output::heading("Checking DDL..."));

    let issues = validate_sql_syntax(&sql);
    for issue in &issues {
        println!("  {}", output::warn_line(&issue.to_string()));
    }
    if issues.is_empty() {
        println!("  {}: no structural issues", output::label("Validation"));
    }

    let repaired = repair(&sql);
    if repaired != sql {
        println!(
            "  {}: repair would modify the input",
            output::label("Repair")
        );
    } else {
        println!("  {}: no changes needed", output::label("Repair"));
    }

    let graph = parse(&repaired)?;
    println!(
        "{}",
        output::success(&format!(
            "OK: {} table(s), {} foreign key(s), {} enum type(s)",
            graph.tables.len(),
            graph.edges.len(),
            graph.enums.len()
        ))
    );
    Ok(())
}
