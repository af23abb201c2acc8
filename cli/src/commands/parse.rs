//! Parse command: SQL DDL to schema graph JSON

use std::path::PathBuf;

use canvasql_sync::{parse, repair};

use crate::commands::{read_file, write_file};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub no_repair: bool,
}

/// Run the parse command
pub fn run(opts: ParseOptions) -> Result<(), CliError> {
    let sql = read_file(&opts.input)?;
    let sql = if opts.no_repair { sql } else { repair(&sql) };

    let graph = parse(&sql)?;
    let json = serde_json::to_string_pretty(&graph)?;

    match opts.output {
        Some(path) => {
            write_file(&path, &json)?;
            println!(
                "{}",
                output::success(&format!(
                    "Parsed {} table(s), {} foreign key(s) into {}",
                    graph.tables.len(),
                    graph.edges.len(),
                    path.display()
                ))
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
