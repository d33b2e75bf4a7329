//! certdedup - main entry point
//!
//! Finds and removes duplicate certificate blocks from TLS bundles.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{error, info, warn};

use certdedup::{CleanReport, FsBundleIo, ListReport};
use certdedup_common::{init_tracing, LogFormat};
use certdedup_config::{CleanerConfig, ConfigError, ConfigOverrides};

/// Every bundle was processed
const EXIT_OK: u8 = 0;
/// The batch finished but some bundles failed
const EXIT_PARTIAL: u8 = 1;
/// Nothing could be processed
const EXIT_FATAL: u8 = 2;

/// certdedup - remove duplicate certificate blocks from TLS bundles
#[derive(Parser, Debug)]
#[command(name = "certdedup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Configuration file path (KDL)
    #[arg(short = 'c', long = "config", env = "CERTDEDUP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding one subdirectory per certificate
    #[arg(long = "live-dir", env = "CERTDEDUP_LIVE_DIR", global = true)]
    live_dir: Option<PathBuf>,

    /// Bundle file name inside each certificate directory
    #[arg(long = "bundle-file", env = "CERTDEDUP_BUNDLE_FILE", global = true)]
    bundle_file: Option<String>,

    /// Where to write identifiers of bundles with duplicates
    #[arg(long = "duplicates-list", env = "CERTDEDUP_DUPLICATES_LIST", global = true)]
    duplicates_list: Option<PathBuf>,

    /// Where to write identifiers of bundles without duplicates
    #[arg(long = "clean-list", env = "CERTDEDUP_CLEAN_LIST", global = true)]
    clean_list: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long = "verbose", global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long = "json-logs", global = true)]
    json_logs: bool,

    /// Summary format printed to stdout
    #[arg(long = "output", value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify every bundle and write the duplicates and clean lists
    List,
    /// Clean every bundle named in the duplicates list
    Clean {
        /// Report what would be removed without writing anything
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Classify a single bundle file without modifying it
    Inspect {
        /// Bundle file to inspect
        path: PathBuf,
    },
    /// Load and validate configuration, then exit
    CheckConfig,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.global.verbose { "debug" } else { "info" };
    let log_format = if cli.global.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(log_level, log_format);

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(ConfigError::Parse { path, source }) => {
            error!(path = %path.display(), "Failed to parse configuration file");
            eprintln!("{:?}", miette::Report::new(source));
            return ExitCode::from(EXIT_FATAL);
        }
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let output = cli.global.output;
    let result = match cli.command {
        Commands::List => run_list(&config, output),
        Commands::Clean { dry_run } => run_clean(&config, dry_run, output),
        Commands::Inspect { path } => run_inspect(&path, output),
        Commands::CheckConfig => check_config(&config, output),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn load_config(args: &GlobalArgs) -> Result<CleanerConfig, ConfigError> {
    let overrides = ConfigOverrides {
        live_dir: args.live_dir.clone(),
        bundle_file: args.bundle_file.clone(),
        duplicates_list: args.duplicates_list.clone(),
        clean_list: args.clean_list.clone(),
    };

    match &args.config {
        Some(path) => info!("Loading configuration from: {}", path.display()),
        None => info!("No configuration file specified, using defaults"),
    }

    CleanerConfig::load(args.config.as_deref(), overrides)
}

/// Classify all bundles and write both list files
fn run_list(config: &CleanerConfig, output: OutputFormat) -> Result<u8> {
    let report = certdedup::list(config, &FsBundleIo).context("Listing bundles failed")?;

    match output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_list_summary(config, &report),
    }

    Ok(exit_code(report.has_failures()))
}

/// Clean every bundle in the duplicates list
fn run_clean(config: &CleanerConfig, dry_run: bool, output: OutputFormat) -> Result<u8> {
    let report =
        certdedup::clean(config, &FsBundleIo, dry_run).context("Cleaning bundles failed")?;

    match output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_clean_summary(&report),
    }

    Ok(exit_code(report.has_failures()))
}

/// Report on a single bundle
fn run_inspect(path: &Path, output: OutputFormat) -> Result<u8> {
    let report = certdedup::inspect_bundle(&FsBundleIo, path)
        .with_context(|| format!("Failed to inspect {}", path.display()))?;

    match output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            println!("{}", path.display());
            println!("  blocks:          {}", report.blocks);
            println!("  distinct blocks: {}", report.distinct_blocks);
            println!(
                "  duplicates:      {}",
                if report.duplicate_found { "yes" } else { "no" }
            );
            println!(
                "  clean would change file: {}",
                if report.would_change { "yes" } else { "no" }
            );
        }
    }

    Ok(EXIT_OK)
}

/// Validate configuration and exit
fn check_config(config: &CleanerConfig, output: OutputFormat) -> Result<u8> {
    let result = config.validate();

    for warning in &result.warnings {
        warn!("{}", warning);
    }
    for error in &result.errors {
        error!("{}", error);
    }

    match output {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Text => {
            println!("live-dir:        {}", config.live_dir.display());
            println!("bundle-file:     {}", config.bundle_file);
            println!("duplicates-list: {}", config.duplicates_list.display());
            println!("clean-list:      {}", config.clean_list.display());
        }
    }

    if result.is_ok() {
        info!(
            warnings = result.warnings.len(),
            "Configuration test successful"
        );
        Ok(EXIT_OK)
    } else {
        error!(errors = result.errors.len(), "Configuration test failed");
        Ok(EXIT_FATAL)
    }
}

fn print_list_summary(config: &CleanerConfig, report: &ListReport) {
    println!(
        "{} bundle(s) with duplicate entries written to {}",
        report.duplicates.len(),
        config.duplicates_list.display()
    );
    println!(
        "{} bundle(s) without duplicate entries written to {}",
        report.clean.len(),
        config.clean_list.display()
    );
    for failure in &report.failed {
        println!("failed: {}: {}", failure.id, failure.reason);
    }
}

fn print_clean_summary(report: &CleanReport) {
    let verb = if report.dry_run { "would remove" } else { "removed" };
    for cleaned in &report.cleaned {
        println!(
            "{}: {} {} of {} block(s)",
            cleaned.id,
            verb,
            cleaned.removed(),
            cleaned.blocks_before
        );
    }
    for failure in &report.failed {
        println!("failed: {}: {}", failure.id, failure.reason);
    }
    println!(
        "{} bundle(s) processed, {} duplicate block(s) {}, {} failure(s)",
        report.cleaned.len(),
        report.blocks_removed(),
        verb,
        report.failed.len()
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

fn exit_code(has_failures: bool) -> u8 {
    if has_failures {
        EXIT_PARTIAL
    } else {
        EXIT_OK
    }
}
