//! canvasql CLI - main entry point
//!
//! File-based access to the sync engine: generate DDL from a schema
//! graph, parse DDL back into a graph, validate/repair hand-edited SQL,
//! and convert DDL between dialects.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use canvasql_cli::commands::{check, convert, generate, parse};
use canvasql_cli::output;
use canvasql_types::Dialect;

/// canvasql - sync schema graphs with SQL DDL
#[derive(Parser, Debug)]
#[command(name = "canvasql")]
#[command(author, version, about = "Sync schema graphs with SQL DDL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Generate SQL DDL from a schema graph JSON file
    Generate {
        /// Path to the schema graph JSON
        input: PathBuf,

        /// Target dialect (postgresql, mysql, sqlite)
        #[arg(short, long, default_value = "postgresql", value_parser = parse_dialect)]
        dialect: Dialect,

        /// Output file (default: schema_<dialect>_<date>.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Parse SQL DDL into schema graph JSON
    Parse {
        /// Path to the SQL file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the repair pre-processing pass
        #[arg(long)]
        no_repair: bool,
    },

    /// Validate and trial-parse SQL DDL without converting it
    Check {
        /// Path to the SQL file
        input: PathBuf,
    },

    /// Re-render SQL DDL for another dialect
    Convert {
        /// Path to the SQL file
        input: PathBuf,

        /// Target dialect (postgresql, mysql, sqlite)
        #[arg(short, long, value_parser = parse_dialect)]
        to: Dialect,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_dialect(s: &str) -> Result<Dialect, String> {
    Dialect::parse(s)
        .ok_or_else(|| format!("unknown dialect `{s}` (expected postgresql, mysql, or sqlite)"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate {
            input,
            dialect,
            output,
            stdout,
        } => generate::run(generate::GenerateOptions {
            input,
            dialect,
            output,
            stdout,
        }),
        Command::Parse {
            input,
            output,
            no_repair,
        } => parse::run(parse::ParseOptions {
            input,
            output,
            no_repair,
        }),
        Command::Check { input } => check::run(check::CheckOptions { input }),
        Command::Convert { input, to, output } => {
            convert::run(convert::ConvertOptions { input, to, output })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", output::err_line(&err.to_string()));
            ExitCode::FAILURE
        }
    }
}
