//! `dialectbench` command line.
//!
//! With no subcommand it evaluates MedNLI, then TruthfulQA, in the data
//! directory and prints a summary. Failed files are reported, not fatal;
//! only configuration problems produce a non-zero exit code.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dialectbench_core::Dataset;
use dialectbench_runtime::dispatcher::{
    discover_truthfulqa, filter_existing, mednli_tasks, translation_tasks,
};
use dialectbench_runtime::{
    BatchSummary, ConfigOverrides, Dispatcher, FileProcessor, FileReport, ProviderRegistry,
    RuntimeConfig,
};

/// Pause between the MedNLI and TruthfulQA stages.
const STAGE_PAUSE: Duration = Duration::from_secs(1);

/// Human-readable progress on stdout, silenced when the summary is JSON.
#[derive(Clone, Copy)]
struct Console {
    quiet: bool,
}

impl Console {
    fn line(&self, text: impl std::fmt::Display) {
        if !self.quiet {
            println!("{}", text);
        }
    }

    fn rule(&self, width: usize) {
        self.line("=".repeat(width));
    }
}

#[derive(Parser)]
#[command(
    name = "dialectbench",
    version,
    about = "Evaluate and translate Korean dialect benchmarks with Gemini"
)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the dataset CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Evaluation model id
    #[arg(long, global = true)]
    model: Option<String>,

    /// Gemini API key (overrides config file and GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API root URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Pause after every row, e.g. `1200ms` or `2s`
    #[arg(long, global = true)]
    request_delay: Option<humantime::Duration>,

    /// Maximum number of files processed at once
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Print the final summary as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate dialect datasets (default)
    Evaluate {
        #[arg(long, value_enum, default_value_t = DatasetArg::All)]
        dataset: DatasetArg,
    },
    /// Translate Korean source datasets into every dialect
    Translate {
        #[arg(long, value_enum, default_value_t = DatasetArg::All)]
        dataset: DatasetArg,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DatasetArg {
    All,
    Mednli,
    Truthfulqa,
}

impl DatasetArg {
    fn includes(self, dataset: Dataset) -> bool {
        match self {
            DatasetArg::All => true,
            DatasetArg::Mednli => dataset == Dataset::MedNli,
            DatasetArg::Truthfulqa => dataset == Dataset::TruthfulQa,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dialectbench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        api_key: cli.api_key,
        model: cli.model,
        endpoint: cli.endpoint,
        request_delay: cli.request_delay.map(Into::into),
        max_workers: cli.workers,
        data_dir: cli.data_dir,
    };
    let config = Arc::new(
        RuntimeConfig::load(cli.config.as_deref(), overrides)
            .context("Failed to load configuration")?,
    );

    let provider = ProviderRegistry::with_defaults()
        .create(&config.provider, &config.provider_settings())
        .context("Failed to create model provider")?;
    if let Some(credential) = config.credential() {
        info!(provider = provider.name(), credential = %credential, "Provider ready");
    }

    let processor =
        Arc::new(FileProcessor::new(provider, Arc::clone(&config)).with_progress_bars());
    let dispatcher = Dispatcher::new(processor, config.max_workers);

    let console = Console { quiet: cli.json };
    let command = cli.command.unwrap_or(Commands::Evaluate {
        dataset: DatasetArg::All,
    });

    let summary = match command {
        Commands::Evaluate { dataset } => {
            console.line("Dialect benchmark evaluation");
            console.line(format!("Model: {}", config.model));
            evaluate(&dispatcher, &config, dataset, console).await
        }
        Commands::Translate { dataset } => {
            console.line("Dialect translation");
            console.line(format!("Model: {}", config.translation_model));
            translate(&dispatcher, &config, dataset, console).await
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, console);
    }
    Ok(())
}

async fn evaluate(
    dispatcher: &Dispatcher,
    config: &RuntimeConfig,
    selection: DatasetArg,
    console: Console,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    if selection.includes(Dataset::MedNli) {
        print_stage_banner(Dataset::MedNli, console);
        let tasks = filter_existing(mednli_tasks(&config.data_dir));
        let reports = dispatcher.run_batch(tasks).await;
        print_stage_result(Dataset::MedNli, &reports, console);
        summary.absorb(&reports);
    }

    if selection == DatasetArg::All {
        tokio::time::sleep(STAGE_PAUSE).await;
    }

    if selection.includes(Dataset::TruthfulQa) {
        print_stage_banner(Dataset::TruthfulQa, console);
        let tasks = match discover_truthfulqa(&config.data_dir) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(dir = %config.data_dir.display(), error = %e, "Cannot scan data directory");
                Vec::new()
            }
        };
        let reports = dispatcher.run_batch(tasks).await;
        print_stage_result(Dataset::TruthfulQa, &reports, console);
        summary.absorb(&reports);
    }

    summary
}

async fn translate(
    dispatcher: &Dispatcher,
    config: &RuntimeConfig,
    selection: DatasetArg,
    console: Console,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for dataset in [Dataset::TruthfulQa, Dataset::MedNli] {
        if !selection.includes(dataset) {
            continue;
        }
        print_stage_banner(dataset, console);
        let tasks = filter_existing(translation_tasks(
            &config.data_dir,
            dataset,
            &config.translation_model,
        ));
        let reports = dispatcher.run_batch(tasks).await;
        print_stage_result(dataset, &reports, console);
        summary.absorb(&reports);
    }

    summary
}

fn print_stage_banner(dataset: Dataset, console: Console) {
    console.line("");
    console.rule(50);
    console.line(dataset);
    console.rule(50);
}

fn print_stage_result(dataset: Dataset, reports: &[FileReport], console: Console) {
    if reports.is_empty() {
        console.line(format!("No {} files to process", dataset));
        return;
    }
    for report in reports {
        if report.success {
            console.line(format!("✓ {}: {} rows", report.dataset_id, report.rows));
        } else {
            console.line(format!("✗ {}: failed", report.dataset_id));
        }
    }
    let stage = BatchSummary::from_reports(reports);
    console.line(format!(
        "{} result: {}/{} files succeeded, {} rows",
        dataset, stage.succeeded, stage.attempted, stage.rows
    ));
}

fn print_summary(summary: &BatchSummary, console: Console) {
    console.line("");
    console.rule(60);
    console.line("Final result");
    console.rule(60);

    if summary.attempted == 0 {
        console.line("No files were processed");
        return;
    }

    console.line(format!("✓ Succeeded: {}/{} files", summary.succeeded, summary.attempted));
    console.line(format!("✓ Rows processed: {}", summary.rows));
    if !summary.failed.is_empty() {
        console.line("");
        console.line(format!("✗ Failed files ({}):", summary.failed.len()));
        for id in &summary.failed {
            console.line(format!("  - {}", id));
        }
    }
}
