//! File processor: one input CSV in, one augmented CSV out.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dialectbench_core::{evaluation_header, translation_header, DatasetRow, TaskKind};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::RuntimeConfig;
use crate::dispatcher::TaskDescriptor;
use crate::pipeline::RowPipeline;
use crate::providers::LlmProvider;
use crate::translator::Translator;

/// Rows between progress log lines.
const PROGRESS_LOG_INTERVAL: usize = 50;

/// Whether the `done`-th written row should be logged at info level.
fn is_progress_checkpoint(done: usize, total: usize) -> bool {
    done == total || done % PROGRESS_LOG_INTERVAL == 0
}

/// File-level failures. They abort the file they occur in and nothing else.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Cannot open input {path}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create output {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input has no data rows")]
    EmptyInput,
}

/// What one file job reports back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub success: bool,
    pub dataset_id: String,
    /// Data rows written; 0 on failure
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn succeeded(dataset_id: impl Into<String>, rows: usize) -> Self {
        Self {
            success: true,
            dataset_id: dataset_id.into(),
            rows,
            error: None,
        }
    }

    pub fn failed(dataset_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            dataset_id: dataset_id.into(),
            rows: 0,
            error: Some(error.into()),
        }
    }
}

/// Input header plus every data row, read up front.
struct InputTable {
    header: Arc<Vec<String>>,
    rows: Vec<DatasetRow>,
}

fn read_input(path: &Path) -> Result<InputTable, ProcessError> {
    let file = File::open(path).map_err(|source| ProcessError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let header: Arc<Vec<String>> =
        Arc::new(reader.headers()?.iter().map(str::to_string).collect());

    let mut rows = Vec::new();
    for record in reader.records() {
        let values = record?.iter().map(str::to_string).collect();
        rows.push(DatasetRow::new(Arc::clone(&header), values));
    }

    Ok(InputTable { header, rows })
}

/// How each row of a file is turned into an output record.
enum RowDriver {
    Evaluate(RowPipeline),
    Translate(Translator),
}

/// Streams files through the row pipeline or the translator.
///
/// Rows are handled one after another in input order, each followed by the
/// configured request delay. The output is flushed after every row so an
/// interrupted run leaves complete rows behind.
pub struct FileProcessor {
    provider: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
    progress: Option<MultiProgress>,
}

impl FileProcessor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: Arc<RuntimeConfig>) -> Self {
        Self {
            provider,
            config,
            progress: None,
        }
    }

    /// Draw one progress bar per file on stderr.
    pub fn with_progress_bars(mut self) -> Self {
        self.progress = Some(MultiProgress::new());
        self
    }

    fn progress_bar(&self, total: usize, dataset_id: &str) -> ProgressBar {
        let Some(multi) = &self.progress else {
            return ProgressBar::hidden();
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏ ");
        let bar = multi.add(ProgressBar::new(total as u64));
        bar.set_style(style);
        bar.set_message(dataset_id.to_string());
        bar
    }

    /// Process one file. Never panics on bad input; all failures end up in
    /// the report.
    pub async fn process(&self, task: &TaskDescriptor) -> FileReport {
        let dataset_id = task.dataset_id();
        info!(
            dataset = %dataset_id,
            input = %task.input.display(),
            output = %task.output.display(),
            "Processing file"
        );

        match self.process_file(task, &dataset_id).await {
            Ok(rows) => {
                info!(dataset = %dataset_id, rows, "File complete");
                FileReport::succeeded(dataset_id, rows)
            }
            Err(e) => {
                error!(dataset = %dataset_id, error = %e, "File failed");
                FileReport::failed(dataset_id, e.to_string())
            }
        }
    }

    fn driver(&self, task: &TaskDescriptor) -> RowDriver {
        let completion = self.config.completion_config(task.model.as_deref());
        match task.kind {
            TaskKind::Translation(_) => RowDriver::Translate(Translator::new(
                Arc::clone(&self.provider),
                completion,
                task.tag.dialect(),
            )),
            kind => RowDriver::Evaluate(RowPipeline::new(
                Arc::clone(&self.provider),
                completion,
                kind,
                task.tag.clone(),
            )),
        }
    }

    async fn process_file(
        &self,
        task: &TaskDescriptor,
        dataset_id: &str,
    ) -> Result<usize, ProcessError> {
        let input = read_input(&task.input)?;
        info!(dataset = %dataset_id, rows = input.rows.len(), "Input loaded");

        let output = File::create(&task.output).map_err(|source| ProcessError::CreateOutput {
            path: task.output.clone(),
            source,
        })?;

        if input.rows.is_empty() && !task.kind.empty_input_succeeds() {
            return Err(ProcessError::EmptyInput);
        }

        let header = match task.kind {
            TaskKind::Translation(dataset) => translation_header(dataset, &task.tag),
            kind => evaluation_header(&input.header, kind),
        };

        let mut writer = csv::Writer::from_writer(output);
        writer.write_record(&header)?;
        writer.flush()?;

        let driver = self.driver(task);
        let total = input.rows.len();
        let bar = self.progress_bar(total, dataset_id);
        let mut written = 0;

        for (index, row) in input.rows.iter().enumerate() {
            let record = match &driver {
                RowDriver::Evaluate(pipeline) => {
                    pipeline
                        .run(index, row)
                        .await
                        .render(pipeline.task(), row, &header)
                }
                RowDriver::Translate(translator) => {
                    translator.translate_row(task.kind.dataset(), row).await
                }
            };

            writer.write_record(&record)?;
            writer.flush()?;
            written += 1;
            bar.inc(1);
            if is_progress_checkpoint(written, total) {
                info!(dataset = %dataset_id, done = written, total, "Progress");
            } else {
                debug!(dataset = %dataset_id, row = index, "Row written");
            }

            if !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        bar.finish();
        Ok(written)
    }
}
