//! Row pipeline: build → send → parse → score for one evaluation row.

use std::sync::Arc;

use dialectbench_core::{build_prompt, score_reply, DatasetRow, DialectTag, RowOutcome, RowStage, TaskKind};
use tracing::{debug, warn};

use crate::providers::{CompletionConfig, LlmProvider};

/// Runs evaluation rows of one file against a provider.
///
/// Never fails: build and model errors become [`RowOutcome::Failed`] for
/// entailment rows. Multiple-choice rows whose model call fails are scored
/// as if the model had returned no text.
pub struct RowPipeline {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    task: TaskKind,
    tag: DialectTag,
}

impl RowPipeline {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        completion: CompletionConfig,
        task: TaskKind,
        tag: DialectTag,
    ) -> Self {
        Self {
            provider,
            completion,
            task,
            tag,
        }
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    /// Process one row. `index` is the zero-based data row number, used in logs.
    pub async fn run(&self, index: usize, row: &DatasetRow) -> RowOutcome {
        let prompt = match build_prompt(self.task, row, &self.tag) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(dialect = %self.tag, row = index, error = %e, "Prompt build failed");
                return RowOutcome::failed(RowStage::Built, e.to_string());
            }
        };

        let reply = match self.provider.complete(&prompt.compose(), &self.completion).await {
            Ok(response) => {
                debug!(
                    dialect = %self.tag,
                    row = index,
                    tokens = response.usage.total(),
                    "Model replied"
                );
                response.content
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    dialect = %self.tag,
                    row = index,
                    error = %e,
                    "Model call failed"
                );
                match self.task {
                    TaskKind::MultipleChoice => String::new(),
                    _ => return RowOutcome::failed(RowStage::Sent, e.to_string()),
                }
            }
        };

        let outcome = score_reply(self.task, row, &reply);
        if let RowOutcome::Failed { stage, reason } = &outcome {
            warn!(dialect = %self.tag, row = index, stage = %stage, error = %reason, "Row not scored");
        }
        outcome
    }
}
