//! JSON Check CLI
//!
//! Loads a document, then validates it against a schema, prints a
//! structural hash, or lists its top-level members.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use json_loader::{Loader, LoaderConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "json-check")]
#[command(about = "Validate, hash and inspect JSON documents")]
struct Cli {
    /// Configuration file (defaults: json-loader.toml and JSON_LOADER__* variables)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against a JSON Schema
    Validate {
        /// Document to validate
        file: PathBuf,
        /// Schema file
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Print the structural hash of a document or one of its members
    Hash {
        /// Document to hash
        file: PathBuf,
        /// Hash only this top-level member
        #[arg(short, long)]
        key: Option<String>,
    },

    /// List top-level members and their types
    Keys {
        /// Document to inspect
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = LoaderConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    let loader = Loader::new(&config);

    match cli.command {
        Commands::Validate { file, schema } => {
            let document = loader.load_from_file(&file)?;
            let schema_text = std::fs::read_to_string(&schema)
                .with_context(|| format!("reading schema {}", schema.display()))?;

            document
                .root()
                .validate_schema_with(&schema_text, &config.validation)?;
            println!("✅ {} conforms to {}", file.display(), schema.display());
            Ok(())
        }

        Commands::Hash { file, key } => {
            let document = loader.load_from_file(&file)?;
            let root = document.root();
            let view = match key {
                Some(key) => root.get_object(&key, false)?,
                None => root,
            };
            println!("{:016x}", view.hash());
            Ok(())
        }

        Commands::Keys { file } => {
            let document = loader.load_from_file(&file)?;
            document.root().iterate(|name, child| {
                println!("{}\t{}", name, child.kind());
                true
            })?;
            Ok(())
        }
    }
}
