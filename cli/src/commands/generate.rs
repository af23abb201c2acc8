//! Generate command: schema graph JSON to SQL DDL

use std::path::PathBuf;

use canvasql_sync::Generator;
use canvasql_types::{Dialect, SchemaGraph};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::commands::{read_file, write_file};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input: PathBuf,
    pub dialect: Dialect,
    pub output: Option<PathBuf>,
    pub stdout: bool,
}

/// Run the generate command
pub fn run(opts: GenerateOptions) -> Result<(), CliError> {
    let json = read_file(&opts.input)?;
    let graph: SchemaGraph = serde_json::from_str(&json)?;

    let out = Generator::new(opts.dialect).generate(&graph);
    for warning in &out.warnings {
        eprintln!("{}", output::warn_line(&warning.to_string()));
    }

    if opts.stdout {
        print!("{}", out.sql);
        return Ok(());
    }

    let path = opts
        .output
        .unwrap_or_else(|| PathBuf::from(default_file_name(opts.dialect)));
    write_file(&path, &out.sql)?;
    println!(
        "{}",
        output::success(&format!(
            "Generated {} DDL for {} table(s) into {}",
            opts.dialect,
            graph.tables.len(),
            path.display()
        ))
    );
    Ok(())
}

/// Download naming convention: `schema_<dialect>_<ISO-date>.sql`
#[must_use]
pub fn default_file_name(dialect: Dialect) -> String {
    let format = format_description!("[year]-[month]-[day]");
    let date = OffsetDateTime::now_utc()
        .date()
        .format(&format)
        .expect("static date format");
    format!("schema_{dialect}_{date}.sql")
}
