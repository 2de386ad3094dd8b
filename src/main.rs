use cli::{Cli, Commands};
use color_eyre::eyre::{bail, Context};
use color_eyre::Result;
use hl7_bridge::{
    batch::{self, BatchInput, BatchSummary},
    Config, Engine, SegmentType,
};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, instrument};
use tracing_subscriber::{filter, prelude::*, Registry};

mod cli;

const DEFAULT_CONFIG: &str = "hl7-bridge.toml";

fn setup_logging(cli: &Cli) -> Result<()> {
    let use_colours = match (cli.colour, &cli.log_file) {
        (clap::ColorChoice::Never, _) => false,
        (clap::ColorChoice::Always, _) => true,
        (_, Some(_)) => false,
        (_, None) => std::io::stderr().is_terminal(),
    };

    color_eyre::config::HookBuilder::new()
        .theme(if use_colours {
            color_eyre::config::Theme::dark()
        } else {
            color_eyre::config::Theme::new()
        })
        .install()?;

    let log_level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let logs_filter = move |metadata: &tracing::Metadata<'_>| {
        metadata.target().starts_with("hl7_bridge") && *metadata.level() <= log_level
    };

    let stderr_log = if cli.log_file.is_none() {
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(use_colours)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .with_filter(filter::filter_fn(logs_filter)),
        )
    } else {
        None
    };

    let file_log = if let Some(log_file) = &cli.log_file {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .wrap_err_with(|| format!("Failed to open log file: {log_file:?}"))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(use_colours)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_target(false)
                .with_level(true)
                .with_writer(file)
                .with_filter(filter::filter_fn(logs_filter)),
        )
    } else {
        None
    };

    Registry::default().with(stderr_log).with(file_log).init();
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn load_engine(cli: &Cli) -> Result<Engine> {
    let config = match &cli.config {
        Some(path) => {
            Config::load(path).wrap_err_with(|| format!("Failed to load config: {path:?}"))?
        }
        None if Path::new(DEFAULT_CONFIG).is_file() => Config::load(DEFAULT_CONFIG)
            .wrap_err_with(|| format!("Failed to load config: {DEFAULT_CONFIG}"))?,
        None => Config::default(),
    };
    Engine::from_config(&config).wrap_err("Failed to build the field schema registry")
}

fn read_message(path: &Path) -> Result<String> {
    fs::read_to_string(path).wrap_err_with(|| format!("Failed to read message file: {path:?}"))
}

/// Wire text with segment terminators swapped for newlines, for a terminal.
fn printable(wire: &str) -> String {
    wire.replace('\r', "\n")
}

fn process(engine: &Engine, files: &[PathBuf], source: Option<&str>, ack_only: bool) -> Result<ExitCode> {
    let mut failed = false;
    for path in files {
        let raw = read_message(path)?;
        let label = source
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());

        match engine.process(&raw, &label) {
            Ok(result) if ack_only => println!("{}", printable(&result.acknowledgment_wire)),
            Ok(result) => println!(
                "{}",
                serde_json::to_string_pretty(&result).wrap_err("Failed to serialize result")?
            ),
            Err(err) => {
                failed = true;
                error!(source = %label, "failed to parse message: {err}");
                let ack = engine
                    .acknowledger()
                    .fallback(&format!("parse error: {err}"));
                if ack_only {
                    println!("{}", printable(&ack));
                } else {
                    let output = serde_json::json!({
                        "source": label,
                        "error": err.to_string(),
                        "acknowledgment_wire": ack,
                    });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&output)
                            .wrap_err("Failed to serialize result")?
                    );
                }
            }
        }
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn validate(engine: &Engine, files: &[PathBuf]) -> Result<ExitCode> {
    let mut all_valid = true;
    for path in files {
        let result = engine.validate_only(&read_message(path)?);
        all_valid &= result.valid;
        let output = serde_json::json!({
            "source": path.display().to_string(),
            "valid": result.valid,
            "errors": result.errors,
            "warnings": result.warnings,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).wrap_err("Failed to serialize result")?
        );
    }
    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_batch(engine: &Engine, files: &[PathBuf], workers: usize) -> Result<ExitCode> {
    let inputs = files
        .iter()
        .map(|path| {
            Ok(BatchInput {
                source: path.display().to_string(),
                raw: read_message(path)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let outcomes = batch::run(engine, inputs, workers);
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => println!("{}: {}", outcome.source, result.status),
            Err(err) => println!("{}: unparseable ({err})", outcome.source),
        }
    }

    let summary: BatchSummary = outcomes.iter().collect();
    info!(?summary, "batch complete");
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).wrap_err("Failed to serialize summary")?
    );
    Ok(if summary.accepted == summary.total() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn describe(engine: &Engine, target: &str) -> Result<ExitCode> {
    let (segment, position) = match target.split_once('.') {
        Some((segment, position)) => {
            let position: usize = position
                .parse()
                .wrap_err_with(|| format!("Invalid field position in {target:?}"))?;
            (segment, Some(position))
        }
        None => (target, None),
    };
    let segment_type = SegmentType::from(segment.to_ascii_uppercase().as_str());
    let registry = engine.registry();
    let Some(schema) = registry.schema(&segment_type) else {
        bail!("No schema for segment {segment_type}");
    };

    match position {
        Some(position) => println!(
            "{segment_type}.{position}: {}",
            registry.describe_field(&segment_type, position)
        ),
        None => {
            println!("{segment_type}: {}", schema.description);
            for field in schema.fields() {
                println!(
                    "  {segment_type}.{}: {}",
                    field.position,
                    registry.describe_field(&segment_type, field.position)
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = cli::cli();
    setup_logging(&cli).wrap_err_with(|| "Failed to setup logging")?;
    let engine = load_engine(&cli)?;

    match &cli.command {
        Commands::Process {
            files,
            source,
            ack_only,
        } => process(&engine, files, source.as_deref(), *ack_only),
        Commands::Validate { files } => validate(&engine, files),
        Commands::Batch { files, workers } => run_batch(&engine, files, *workers),
        Commands::Describe { target } => describe(&engine, target),
    }
}
