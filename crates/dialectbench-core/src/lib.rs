//! # dialectbench-core
//!
//! Deterministic pieces of the dialect benchmark: everything that turns a
//! CSV row into a prompt and a model reply into a scored output row.
//!
//! ## Key Guarantees
//!
//! 1. **No I/O**: prompts, parsing and scoring are pure string work
//! 2. **Total**: every reply yields an outcome, unparseable ones fall back to sentinels
//! 3. **Column-driven**: rows are addressed by header name using the file's own dialect spelling
//!
//! ## Example
//!
//! ```rust,ignore
//! use dialectbench_core::{build_prompt, score_reply, DatasetRow, DialectTag, TaskKind};
//!
//! let tag = DialectTag::parse("jeju")?;
//! let prompt = build_prompt(TaskKind::Entailment, &row, &tag)?;
//! let reply = call_model(&prompt.compose()).await?;
//! let outcome = score_reply(TaskKind::Entailment, &row, &reply);
//! let record = outcome.render(TaskKind::Entailment, &row, &header);
//! ```

pub mod dialect;
pub mod labels;
pub mod outcome;
pub mod parser;
pub mod prompts;
pub mod row;
pub mod scorer;
pub mod task;

pub use dialect::{Dialect, DialectError, DialectTag};
pub use labels::{parse_label_array, LabelParseError};
pub use outcome::{RowFields, RowOutcome, RowStage, ERROR_SENTINEL};
pub use parser::{parse_classification, parse_multiple_choice, ChoiceAnswer, NliLabel};
pub use prompts::{build_prompt, translation_prompt, Prompt};
pub use row::{DatasetRow, RowError};
pub use scorer::{score_choice_answer, score_label, ChoiceVerdict};
pub use task::{evaluation_header, translation_header, translation_layout, Dataset, TaskKind, TranslationColumn};

use task::{GOLD_LABEL, MC1_LABELS, MC2_LABELS};

/// Parse a model reply and score it against the row's gold fields.
///
/// Malformed gold arrays make the affected verdict false and are logged;
/// they never fail the row.
pub fn score_reply(task: TaskKind, row: &DatasetRow, reply: &str) -> RowOutcome {
    match task {
        TaskKind::Entailment => {
            let answer = parse_classification(reply);
            match row.require(GOLD_LABEL) {
                Ok(gold) => RowOutcome::Completed(RowFields::Entailment {
                    answer,
                    correct: score_label(answer.as_str(), gold.trim()),
                }),
                Err(e) => RowOutcome::failed(RowStage::Scored, e.to_string()),
            }
        }
        TaskKind::MultipleChoice => {
            let answer = parse_multiple_choice(reply);
            let (verdict, errors) = score_choice_answer(
                &answer,
                row.get(MC1_LABELS).unwrap_or_default(),
                row.get(MC2_LABELS).unwrap_or_default(),
            );
            for error in &errors {
                tracing::warn!(error = %error, "Gold labels unreadable, verdict set to False");
            }
            RowOutcome::Completed(RowFields::MultipleChoice { answer, verdict })
        }
        TaskKind::Translation(dataset) => RowOutcome::failed(
            RowStage::Scored,
            RowError::Unsupported(format!("{} translation is not scored", dataset)).to_string(),
        ),
    }
}
