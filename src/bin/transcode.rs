//! Schema Transcoding CLI
//!
//! Drives the registered activities from the command line: feed a schema file
//! (or stdin) through one of the converters and print the result. Exits
//! non-zero when the activity reports a failure through its error outputs.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use schema_transcode::activity::{registry, MapContext};

#[derive(Parser)]
#[command(name = "transcode")]
#[command(about = "Convert between JSON Schema and XSD")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a JSON Schema document to XSD
    ToXsd {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,

        /// Name of the generated root element
        #[arg(short, long)]
        root_element: String,

        /// Target namespace for the generated schema
        #[arg(short, long)]
        target_namespace: Option<String>,
    },
    /// Convert an XSD document to JSON Schema
    ToJson {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (activity_id, inputs, primary_output) = match &cli.command {
        Command::ToXsd {
            input,
            root_element,
            target_namespace,
        } => {
            let mut inputs = vec![
                ("jsonSchemaString", Value::String(read_input(input.as_deref())?)),
                ("rootElementName", json!(root_element)),
            ];
            if let Some(namespace) = target_namespace {
                inputs.push(("targetNamespace", json!(namespace)));
            }
            ("json-schema-to-xsd", inputs, "xsdString")
        }
        Command::ToJson { input } => (
            "xsd-to-json-schema",
            vec![("xsdString", Value::String(read_input(input.as_deref())?))],
            "jsonSchemaString",
        ),
    };

    let activity = registry()
        .get(activity_id)
        .ok_or_else(|| format!("activity '{}' is not registered", activity_id))?;

    let mut ctx = MapContext::with_inputs(inputs);
    activity.eval(&mut ctx)?;

    if ctx.output_bool("error") {
        eprintln!("{}", ctx.output_str("errorMessage"));
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", ctx.output_str(primary_output));
    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&std::path::Path>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
