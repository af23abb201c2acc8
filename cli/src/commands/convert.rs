//! Convert command: re-render SQL DDL for another dialect

use std::path::PathBuf;

use canvasql_sync::{Generator, parse, repair};
use canvasql_types::Dialect;

use crate::commands::{read_file, write_file};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub to: Dialect,
    pub output: Option<PathBuf>,
}

/// Run the convert command: repair, parse, regenerate for the target
/// dialect
pub fn run(opts: ConvertOptions) -> Result<(), CliError> {
    let sql = read_file(&opts.input)?;
    let graph = parse(&repair(&sql))?;

    let out = Generator::new(opts.to).generate(&graph);
    for warning in &out.warnings {
        eprintln!("{}", output::warn_line(&warning.to_string()));
    }

    match opts.output {
        Some(path) => {
            write_file(&path, &out.sql)?;
            println!(
                "{}",
                output::success(&format!("Converted to {} in {}", opts.to, path.display()))
            );
        }
        None => print!("{}", out.sql),
    }
    Ok(())
}
