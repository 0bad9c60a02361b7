//! json-sieve CLI.
//!
//! Validates JSON documents against a schema file while parsing them.
//!
//! Usage:
//!   json-sieve validate --schema person.schema.json --input person.json
//!   json-sieve validate --schema person.schema.json < person.json

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use json_sieve::{ParseOptions, SchemaParser};

#[derive(Parser)]
#[command(name = "json-sieve")]
#[command(about = "Schema-directed streaming JSON validator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON document against a schema
    Validate {
        /// Path to the JSON Schema file
        #[arg(long)]
        schema: PathBuf,

        /// Input document; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Parse and print the document without applying the schema
        #[arg(long)]
        skip_validation: bool,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate {
            schema,
            input,
            skip_validation,
        }) => match run_validate(&schema, input.as_deref(), skip_validation) {
            Ok(rendered) => {
                println!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
        Some(Commands::Version) => {
            println!("json-sieve v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        None => {
            println!("json-sieve v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            ExitCode::SUCCESS
        }
    }
}

fn run_validate(
    schema_path: &std::path::Path,
    input: Option<&std::path::Path>,
    skip_validation: bool,
) -> Result<String> {
    let schema_text = fs::read_to_string(schema_path)
        .with_context(|| format!("reading schema file {}", schema_path.display()))?;
    let description: serde_json::Value =
        serde_json::from_str(&schema_text).context("parsing schema file as JSON")?;

    let parser = SchemaParser::new(&description).context("compiling schema")?;

    let document = read_document(input)?;
    let options = ParseOptions {
        skip_validation,
        ..ParseOptions::default()
    };
    let value = parser
        .parse_with_options(&document, options)
        .context("validating document")?;

    Ok(value.to_string())
}

fn read_document(input: Option<&std::path::Path>) -> Result<String> {
    let mut buf = String::new();
    match input {
        Some(path) => {
            buf = fs::read_to_string(path)
                .with_context(|| format!("reading input file {}", path.display()))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
        }
    }
    Ok(buf)
}
