//! SqlScope Command-Line Interface
//!
//! Parses the SQL statement in a file and writes the analysis tree as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Parse input.sql into ast.json
//! sqlscope
//!
//! # Choose input and output files
//! sqlscope query.sql -o query.json
//!
//! # Echo an indented tree instead of JSON
//! sqlscope --format tree
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sqlscope_common::{DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE};
use sqlscope_sql::Node;

mod formatter;

use formatter::{format_tree, OutputFormat};

/// SqlScope command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "sqlscope",
    author = "SqlScope Team",
    version,
    about = "Parse a SQL file into an AST and execution plan",
    long_about = "Reads one SQL statement from a file, parses it, and writes the\n\
                  abstract syntax tree and logical execution plan as JSON."
)]
struct Args {
    /// SQL file to parse
    #[arg(value_name = "INPUT", default_value = DEFAULT_INPUT_FILE)]
    input: PathBuf,

    /// JSON file to write
    #[arg(short = 'o', long, value_name = "FILE", default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Format of the console echo
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormatArg,

    /// Do not echo the result
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Indented JSON
    Json,
    /// Indented node tree
    Tree,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Tree => OutputFormat::Tree,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let sql = read_sql(&args.input)?;
    if !args.quiet {
        println!("Parsing SQL: {}", sql.trim());
    }

    let tree = sqlscope_sql::parse(&sql);
    if tree.is_error() {
        info!(
            "Statement did not parse: {}",
            tree.message.as_deref().unwrap_or_default()
        );
    }

    write_tree(&tree, &args.output)?;

    if !args.quiet {
        println!("AST written to {}", args.output.display());
        println!();
        println!("{}", format_tree(&tree, args.format.into())?.trim_end());
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sqlscope=debug,sqlscope_sql=debug")
    } else {
        EnvFilter::new("sqlscope=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the SQL source, rejecting a missing or blank file.
fn read_sql(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("cannot find file {}", path.display());
    }

    let sql = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if sql.trim().is_empty() {
        bail!("SQL file {} is empty", path.display());
    }

    debug!("Read {} bytes from {}", sql.len(), path.display());
    Ok(sql)
}

/// Writes the tree as indented JSON.
fn write_tree(tree: &Node, path: &Path) -> Result<()> {
    let json = tree.to_json_pretty()?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}
