use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use cardsift::{
    load_settings, run_job, CardsiftError, JobReport, JsonLinesSink, LogSink, ProgressSink,
    RunConfig, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "cardsift")]
#[command(about = "Keeps the lines of each file that carry a valid Visa or Mastercard number")]
#[command(version)]
struct Cli {
    /// Directory whose top-level files are filtered
    source_directory: PathBuf,

    /// Directory receiving one filtered file per source file
    destination_directory: PathBuf,

    /// Number of files processed concurrently (default: CPU count x 1.7)
    #[arg(short, long)]
    parallelism: Option<usize>,

    /// Lines read and written per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// JSON settings file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stream progress events as JSON lines on stdout
    #[arg(long)]
    progress_json: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also land here
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    if let Err(e) = setup_logging(cli.verbose, cli.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(1);
    }

    match run(&cli) {
        Ok(report) => {
            info!(
                "All {} files processed, {} lines kept",
                report.outcomes.len(),
                report.lines_written()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e.exit_code();
            if code == 1 {
                eprintln!("Error: {}\n\n{}", e, Cli::command().render_usage());
            } else {
                error!("{}", e);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<JobReport, CardsiftError> {
    let config = RunConfig::new(
        &cli.source_directory,
        &cli.destination_directory,
        resolve_settings(cli)?,
    );

    let sink: Arc<dyn ProgressSink> = if cli.progress_json {
        Arc::new(JsonLinesSink::stdout())
    } else {
        Arc::new(LogSink)
    };

    let report = run_job(&config, sink)?;
    Ok(report.into_result()?)
}

fn resolve_settings(cli: &Cli) -> Result<Settings, CardsiftError> {
    let mut settings = match &cli.config {
        Some(path) => {
            let settings = load_settings(path)?;
            info!("Loaded settings from {:?}", path);
            settings
        }
        None => Settings::default(),
    };

    if let Some(parallelism) = cli.parallelism {
        settings.parallelism = Some(parallelism);
    }
    if let Some(chunk_size) = cli.chunk_size {
        settings.chunk_size = chunk_size;
    }

    Ok(settings)
}

/// Routes `log` records into `tracing` and installs the global subscriber on stderr.
fn setup_logging(verbose: u8, format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    tracing_log::LogTracer::init()?;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_writer(std::io::stderr).with_target(false)),
        )?,
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        )?,
    }

    Ok(())
}
