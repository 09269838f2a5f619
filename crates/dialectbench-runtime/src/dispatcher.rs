//! Batch dispatch: task catalogs, discovery and the bounded worker pool.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dialectbench_core::{Dataset, Dialect, DialectTag, TaskKind};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::processor::{FileProcessor, FileReport};

/// MedNLI evaluation inputs: (input, output, column spelling).
const MEDNLI_FILES: [(&str, &str, &str); 4] = [
    (
        "mednli_jeju.GPT-5.csv",
        "mednli_jeju.GPT-5-pro_eval_Hallucination_gemini3.csv",
        "jeju",
    ),
    (
        "mednli_chungchung.GPT-5.csv",
        "mednli_choochung.GPT-5-pro_eval_Hallucination_gemini3.csv",
        "choongchung",
    ),
    (
        "mednli_jeollra.GPT-5.csv",
        "mednli_Jeolla.GPT-5-pro_eval_Hallucination_gemini3.csv",
        "jeonra",
    ),
    (
        "mednli_Gyeongsang.GPT-5.csv",
        "mednli_Gyeongsang.GPT-5-pro_eval_Hallucination_gemini3.csv",
        "kyungsang",
    ),
];

const TRUTHFULQA_PREFIX: &str = "truthfulqa_";
const EVALUATED_MARKER: &str = "_evaluated";

const TRUTHFULQA_TRANSLATION_SOURCE: &str = "TruthfulQA_result-gpt4o-gpt4o.csv";
const MEDNLI_TRANSLATION_SOURCE: &str = "mednli_kor.csv";

/// One file job. Built by the catalogs below and consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tag: DialectTag,
    /// Model override; `None` uses the configured evaluation model
    pub model: Option<String>,
    pub kind: TaskKind,
}

impl TaskDescriptor {
    pub fn dataset_id(&self) -> String {
        self.kind.dataset_id(&self.tag)
    }
}

/// The fixed MedNLI evaluation table, resolved against `data_dir`.
pub fn mednli_tasks(data_dir: &Path) -> Vec<TaskDescriptor> {
    MEDNLI_FILES
        .iter()
        .filter_map(|(input, output, spelling)| match DialectTag::parse(*spelling) {
            Ok(tag) => Some(TaskDescriptor {
                input: data_dir.join(input),
                output: data_dir.join(output),
                tag,
                model: None,
                kind: TaskKind::Entailment,
            }),
            Err(e) => {
                warn!(error = %e, "Skipping MedNLI entry");
                None
            }
        })
        .collect()
}

/// Whether a file name is an unevaluated TruthfulQA input.
pub fn is_truthfulqa_input(file_name: &str) -> bool {
    file_name.starts_with(TRUTHFULQA_PREFIX)
        && file_name.ends_with(".csv")
        && !file_name.contains(EVALUATED_MARKER)
}

/// Output name for a TruthfulQA input: `.csv` becomes `_evaluated.csv`.
pub fn evaluated_file_name(file_name: &str) -> String {
    match file_name.strip_suffix(".csv") {
        Some(stem) => format!("{}{}.csv", stem, EVALUATED_MARKER),
        None => format!("{}{}.csv", file_name, EVALUATED_MARKER),
    }
}

/// Scan `data_dir` for TruthfulQA inputs, sorted by file name.
///
/// Files whose dialect cannot be read from the name are skipped.
pub fn discover_truthfulqa(data_dir: &Path) -> io::Result<Vec<TaskDescriptor>> {
    let mut names: Vec<String> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_truthfulqa_input(name))
        .collect();
    names.sort();

    let mut tasks = Vec::with_capacity(names.len());
    for name in names {
        match DialectTag::from_truthfulqa_file_name(&name) {
            Ok(tag) => {
                info!(file = %name, dialect = %tag.dialect(), "Discovered TruthfulQA file");
                tasks.push(TaskDescriptor {
                    input: data_dir.join(&name),
                    output: data_dir.join(evaluated_file_name(&name)),
                    tag,
                    model: None,
                    kind: TaskKind::MultipleChoice,
                });
            }
            Err(e) => warn!(file = %name, error = %e, "Skipping TruthfulQA file"),
        }
    }
    Ok(tasks)
}

/// One translation task per dialect for `dataset`.
pub fn translation_tasks(data_dir: &Path, dataset: Dataset, model: &str) -> Vec<TaskDescriptor> {
    Dialect::ALL
        .iter()
        .map(|dialect| {
            let (input, output) = match dataset {
                Dataset::TruthfulQa => (
                    TRUTHFULQA_TRANSLATION_SOURCE.to_string(),
                    format!("truthfulqa_{}-{}.csv", dialect, model),
                ),
                Dataset::MedNli => (
                    MEDNLI_TRANSLATION_SOURCE.to_string(),
                    format!("mednli_{}.{}.csv", dialect, model),
                ),
            };
            TaskDescriptor {
                input: data_dir.join(input),
                output: data_dir.join(output),
                tag: DialectTag::canonical(*dialect),
                model: Some(model.to_string()),
                kind: TaskKind::Translation(dataset),
            }
        })
        .collect()
}

/// Keep tasks whose input exists, logging each decision.
pub fn filter_existing(tasks: Vec<TaskDescriptor>) -> Vec<TaskDescriptor> {
    tasks
        .into_iter()
        .filter(|task| {
            let found = task.input.is_file();
            if found {
                info!(dataset = %task.dataset_id(), input = %task.input.display(), "Input found");
            } else {
                warn!(dataset = %task.dataset_id(), input = %task.input.display(), "Input missing, skipping");
            }
            found
        })
        .collect()
}

/// Totals over a set of file reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    /// Rows of succeeded files only
    pub rows: usize,
    pub failed: Vec<String>,
}

impl BatchSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self::default();
        summary.absorb(reports);
        summary
    }

    /// Add another batch's reports.
    pub fn absorb(&mut self, reports: &[FileReport]) {
        for report in reports {
            self.attempted += 1;
            if report.success {
                self.succeeded += 1;
                self.rows += report.rows;
            } else {
                self.failed.push(report.dataset_id.clone());
            }
        }
    }
}

/// Runs file jobs on at most `max_workers` concurrent tasks.
pub struct Dispatcher {
    processor: Arc<FileProcessor>,
    max_workers: usize,
}

impl Dispatcher {
    pub fn new(processor: Arc<FileProcessor>, max_workers: usize) -> Self {
        Self {
            processor,
            max_workers: max_workers.max(1),
        }
    }

    /// Process every task and return one report per task, in task order.
    ///
    /// A job that panics is reported as a failed file; the other jobs keep
    /// running.
    pub async fn run_batch(&self, tasks: Vec<TaskDescriptor>) -> Vec<FileReport> {
        if tasks.is_empty() {
            info!("No files to process");
            return Vec::new();
        }

        let workers = self.max_workers.min(tasks.len());
        info!(files = tasks.len(), workers, "Dispatching files");

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            let semaphore = Arc::clone(&semaphore);
            let processor = Arc::clone(&self.processor);
            let dataset_id = task.dataset_id();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return FileReport::failed(task.dataset_id(), e.to_string()),
                };
                processor.process(&task).await
            });

            handles.push((dataset_id, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (dataset_id, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(dataset = %dataset_id, error = %e, "File task panicked");
                    reports.push(FileReport::failed(dataset_id, format!("Task panicked: {}", e)));
                }
            }
        }

        reports
    }
}
