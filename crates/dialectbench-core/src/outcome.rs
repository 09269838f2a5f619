//! Per-row results and their rendering into output cells.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::{verdict_cell, ChoiceAnswer, NliLabel};
use crate::row::DatasetRow;
use crate::scorer::ChoiceVerdict;
use crate::task::{
    TaskKind, AI_ANSWER, AI_ANSWER_MC1, AI_ANSWER_MC2, MC1_RESULT, MC2_RESULT, RESULT,
};

pub const ERROR_SENTINEL: &str = "ERROR";

/// Stages a row moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowStage {
    Built,
    Sent,
    Parsed,
    Scored,
    Written,
}

impl fmt::Display for RowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowStage::Built => "built",
            RowStage::Sent => "sent",
            RowStage::Parsed => "parsed",
            RowStage::Scored => "scored",
            RowStage::Written => "written",
        };
        f.write_str(name)
    }
}

/// Structured fields of a row that made it through scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowFields {
    Entailment {
        answer: NliLabel,
        correct: bool,
    },
    MultipleChoice {
        answer: ChoiceAnswer,
        verdict: ChoiceVerdict,
    },
}

/// Result of one row. Both variants render to cells; a row is never dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Completed(RowFields),
    Failed { stage: RowStage, reason: String },
}

impl RowOutcome {
    pub fn failed(stage: RowStage, reason: impl Into<String>) -> Self {
        RowOutcome::Failed {
            stage,
            reason: reason.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RowOutcome::Completed(_))
    }

    /// Appended cells for this outcome, keyed by column name.
    ///
    /// Failures use the task's sentinels: `ERROR`/`FALSE` for entailment and
    /// `ERROR`/`False`/`[]`/`False` for multiple choice.
    pub fn cells(&self, task: TaskKind) -> Vec<(&'static str, String)> {
        match self {
            RowOutcome::Completed(RowFields::Entailment { answer, correct }) => vec![
                (AI_ANSWER, answer.as_str().to_string()),
                (RESULT, upper_verdict(*correct).to_string()),
            ],
            RowOutcome::Completed(RowFields::MultipleChoice { answer, verdict }) => vec![
                (AI_ANSWER_MC1, answer.mc1_cell()),
                (MC1_RESULT, verdict_cell(verdict.mc1).to_string()),
                (AI_ANSWER_MC2, answer.mc2_cell()),
                (MC2_RESULT, verdict_cell(verdict.mc2).to_string()),
            ],
            RowOutcome::Failed { .. } => failure_cells(task),
        }
    }

    /// Full output record: input values in header order with this outcome's
    /// cells filled in.
    pub fn render(&self, task: TaskKind, row: &DatasetRow, header: &[String]) -> Vec<String> {
        let cells = self.cells(task);
        header
            .iter()
            .map(|column| {
                cells
                    .iter()
                    .find(|(name, _)| *name == column.as_str())
                    .map(|(_, value)| value.clone())
                    .or_else(|| row.get(column).map(str::to_string))
                    .unwrap_or_default()
            })
            .collect()
    }
}

fn upper_verdict(verdict: bool) -> &'static str {
    if verdict {
        "TRUE"
    } else {
        "FALSE"
    }
}

fn failure_cells(task: TaskKind) -> Vec<(&'static str, String)> {
    match task {
        TaskKind::Entailment => vec![
            (AI_ANSWER, ERROR_SENTINEL.to_string()),
            (RESULT, upper_verdict(false).to_string()),
        ],
        TaskKind::MultipleChoice => vec![
            (AI_ANSWER_MC1, ERROR_SENTINEL.to_string()),
            (MC1_RESULT, verdict_cell(false).to_string()),
            (AI_ANSWER_MC2, "[]".to_string()),
            (MC2_RESULT, verdict_cell(false).to_string()),
        ],
        TaskKind::Translation(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_entailment_completed_cells() {
        let outcome = RowOutcome::Completed(RowFields::Entailment {
            answer: NliLabel::Neutral,
            correct: true,
        });
        assert_eq!(
            outcome.cells(TaskKind::Entailment),
            vec![(AI_ANSWER, "neutral".to_string()), (RESULT, "TRUE".to_string())]
        );
    }

    #[test]
    fn test_entailment_failure_sentinels() {
        let outcome = RowOutcome::failed(RowStage::Sent, "timeout");
        assert_eq!(
            outcome.cells(TaskKind::Entailment),
            vec![(AI_ANSWER, "ERROR".to_string()), (RESULT, "FALSE".to_string())]
        );
    }

    #[test]
    fn test_multiple_choice_failure_sentinels() {
        let outcome = RowOutcome::failed(RowStage::Built, "Missing required column: question_");
        let cells: Vec<String> = outcome
            .cells(TaskKind::MultipleChoice)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(cells, vec!["ERROR", "False", "[]", "False"]);
    }

    #[test]
    fn test_multiple_choice_uses_scorer_verdicts() {
        let answer = ChoiceAnswer {
            mc1: Some('B'),
            mc1_reported: true,
            mc2: vec!['A'],
            mc2_reported: true,
        };
        let outcome = RowOutcome::Completed(RowFields::MultipleChoice {
            answer,
            verdict: ChoiceVerdict {
                mc1: false,
                mc2: true,
            },
        });
        let cells = outcome.cells(TaskKind::MultipleChoice);
        assert_eq!(cells[0], (AI_ANSWER_MC1, "B".to_string()));
        assert_eq!(cells[1], (MC1_RESULT, "False".to_string()));
        assert_eq!(cells[2], (AI_ANSWER_MC2, "['A']".to_string()));
        assert_eq!(cells[3], (MC2_RESULT, "True".to_string()));
    }

    #[test]
    fn test_render_overwrites_existing_result_columns() {
        let row = DatasetRow::from_pairs([
            ("gold_label", "entailment"),
            ("ai_answer", "stale"),
            ("sentence1_jeju", "a"),
        ]);
        let out_header = header(&["gold_label", "ai_answer", "sentence1_jeju", "result"]);
        let outcome = RowOutcome::Completed(RowFields::Entailment {
            answer: NliLabel::Entailment,
            correct: true,
        });
        assert_eq!(
            outcome.render(TaskKind::Entailment, &row, &out_header),
            header(&["entailment", "entailment", "a", "TRUE"])
        );
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(RowStage::Parsed.to_string(), "parsed");
    }
}
