//! # Connector Configuration Validator
//!
//! Command-line tool for checking Redis source and sink connector
//! configurations before handing them to a connector host. Prints every
//! validation error at once, the option reference table, or the per-task
//! configurations a connector would produce.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use redis_connect_core::config::connection;
use redis_connect_core::config::loader::ENV_PREFIX;
use redis_connect_core::config::{ConnectorKind, RawConfig, RawConfigLoader, ValidationResult};
use redis_connect_core::connector::{Connector, RedisSinkConnector, RedisSourceConnector};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate Redis connector configurations")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Connector kind (source or sink)
    #[arg(short, long)]
    kind: ConnectorKind,

    /// Configuration file (TOML, YAML, JSON or INI)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Also read REDIS_CONNECT_* environment variables
    #[arg(long)]
    env: bool,

    /// Individual option overrides, e.g. --set redis.command=LPUSH
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Print the per-task configurations for this many tasks
    #[arg(long, value_name = "N")]
    max_tasks: Option<usize>,

    /// Print the option reference table instead of validating
    #[arg(long)]
    docs: bool,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    match run(&cli) {
        Ok(true) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Configuration validation failed: {:#}", e);
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}

/// Returns whether the configuration was valid
fn run(cli: &Cli) -> anyhow::Result<bool> {
    if cli.docs {
        print_docs(cli)?;
        return Ok(true);
    }

    let raw = load_raw(cli)?;
    let mut connector = connector_for(cli.kind);

    let result = connector.validate(&raw)?;
    if result.has_errors() {
        print_validation(cli, &result)?;
        return Ok(false);
    }

    match cli.max_tasks {
        None => print_validation(cli, &result)?,
        Some(max_tasks) => {
            connector.start(raw)?;
            let tasks = connector
                .task_configs(max_tasks)
                .with_context(|| format!("computing task configurations for {max_tasks} tasks"))?;
            connector.stop();
            print_tasks(cli, &tasks)?;
        }
    }
    Ok(true)
}

fn connector_for(kind: ConnectorKind) -> Box<dyn Connector> {
    match kind {
        ConnectorKind::Source => Box::new(RedisSourceConnector::new()),
        ConnectorKind::Sink => Box::new(RedisSinkConnector::new()),
    }
}

fn load_raw(cli: &Cli) -> anyhow::Result<RawConfig> {
    let mut loader = RawConfigLoader::new();
    if let Some(file) = &cli.file {
        loader = loader.with_file(file);
    }
    if cli.env {
        loader = loader.with_env_prefix(ENV_PREFIX);
    }
    for assignment in &cli.overrides {
        let (key, value) = assignment
            .split_once('=')
            .with_context(|| format!("override '{assignment}' is not of the form KEY=VALUE"))?;
        loader = loader.with_override(key.trim(), value);
    }
    Ok(loader.load()?)
}

fn print_docs(cli: &Cli) -> anyhow::Result<()> {
    let schema = cli.kind.schema()?;
    match cli.format {
        OutputFormat::Table => println!("{}", schema.documentation_table()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(schema.options())?),
    }
    Ok(())
}

fn print_validation(cli: &Cli, result: &ValidationResult) -> anyhow::Result<()> {
    let result = result.masked();
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table if result.has_errors() => {
            println!(
                "Invalid {} configuration ({} error(s)):",
                cli.kind,
                result.error_count()
            );
            for message in result.error_messages() {
                println!("  - {message}");
            }
        }
        OutputFormat::Table => {
            println!("Valid {} configuration:", cli.kind);
            for value in result.values() {
                let shown = value
                    .value
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                println!("  {:<32} {}", value.name, shown);
            }
        }
    }
    Ok(())
}

fn print_tasks(cli: &Cli, tasks: &[RawConfig]) -> anyhow::Result<()> {
    // Sorted keys keep the output stable between runs.
    let sorted: Vec<BTreeMap<String, String>> = tasks
        .iter()
        .map(|task| connection::masked(task).into_iter().collect())
        .collect();

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sorted)?),
        OutputFormat::Table => {
            for (index, task) in sorted.iter().enumerate() {
                println!("Task {index}:");
                for (key, value) in task {
                    println!("  {key:<32} {value}");
                }
            }
        }
    }
    Ok(())
}
