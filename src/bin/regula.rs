//! Regula command-line interface
//!
//! Loads base documents into a store, then reads, patches or evaluates
//! against it. Bodies and rules are given in their JSON encoding.
//!
//! # Examples
//!
//! ```bash
//! # Read a value
//! regula --data base.json get '["a", 0]'
//!
//! # Append to an array and print the resulting document
//! regula --data base.json patch add '["a", "-"]' '{"b": 1}'
//!
//! # Evaluate a compiled body as a table
//! regula --data base.json eval query.json --format pretty
//!
//! # Check a rule
//! regula --data base.json rule allow.json --values
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use regula::ast::{Body, Rule, Value};
use regula::format::{render_rule, render_value};
use regula::{OutputFormat, PatchOp, Path, Runtime, RuntimeConfig};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Regula - policy evaluation over JSON documents
#[derive(Parser, Debug)]
#[command(name = "regula")]
#[command(version = regula::VERSION)]
#[command(about = "Regula - policy evaluation over JSON documents", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "REGULA_CONFIG")]
    config: Option<PathBuf>,

    /// Base document to load (repeatable)
    #[arg(long = "data", global = true)]
    data: Vec<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the value at PATH (a JSON array of segments)
    Get { path: Path },

    /// Apply a patch and print the resulting document
    Patch {
        /// add, remove or replace
        op: PatchOp,
        /// Target path as a JSON array
        path: Path,
        /// JSON value (ignored by remove)
        value: Option<serde_json::Value>,
    },

    /// Evaluate a compiled body
    Eval {
        /// File holding the body as JSON
        body: PathBuf,

        /// Output format (pretty, json)
        #[arg(long, short)]
        format: Option<OutputFormat>,
    },

    /// Check whether a compiled rule is defined
    Rule {
        /// File holding the rule as JSON
        rule: PathBuf,

        /// Also print the rule's values
        #[arg(long)]
        values: bool,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli)?;

    let mut config = RuntimeConfig::load(cli.config.as_deref())?;
    config.paths.extend(cli.data.iter().cloned());
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Get { path } => {
            let runtime = Runtime::init(config)?;
            let value = runtime.store().get(&path)?;
            print!("{}", render_value(&value)?);
            Ok(())
        }
        Commands::Patch { op, path, value } => {
            let value = match (op, value) {
                (PatchOp::Remove, _) => Value::Null,
                (_, Some(value)) => Value::from(value),
                (_, None) => anyhow::bail!("{} requires a VALUE", op),
            };
            let runtime = Runtime::init(config)?;
            runtime.store().patch(op, &path, value)?;
            info!(%op, %path, "Patch applied");
            print!("{}", render_value(&runtime.store().dump())?);
            Ok(())
        }
        Commands::Eval { body, format } => {
            if let Some(format) = format {
                config.output_format = format;
            }
            let body: Body = read_json(&body)?;
            let runtime = Runtime::init(config)?;
            print!("{}", runtime.query(&body)?);
            Ok(())
        }
        Commands::Rule { rule, values } => {
            let rule: Rule = read_json(&rule)?;
            let runtime = Runtime::init(config)?;
            let outcome = runtime.check_rule(&rule)?;
            print!("{}", render_rule(&outcome));
            if values {
                for value in outcome.values() {
                    print!("{}", render_value(value)?);
                }
            }
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Version => {
            println!("Regula {}", regula::VERSION);
            Ok(())
        }
    }
}

/// Setup logging on stderr, plus a rolling file when requested
fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    let file_layer = match &cli.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "regula.log");
            Some(fmt::layer().with_writer(file_appender).with_ansi(false))
        }
        None => None,
    };

    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::WARN);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color),
        )
        .with(file_layer)
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(())
}

fn read_json<T: DeserializeOwned>(file: &std::path::Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", file.display()))
}
