//! Task kinds and the CSV columns each one reads and appends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::DialectTag;

pub const GOLD_LABEL: &str = "gold_label";
pub const AI_ANSWER: &str = "ai_answer";
pub const RESULT: &str = "result";
pub const AI_ANSWER_MC1: &str = "ai_answer_mc1";
pub const MC1_RESULT: &str = "mc1_result";
pub const AI_ANSWER_MC2: &str = "ai_answer_mc2";
pub const MC2_RESULT: &str = "mc2_result";
pub const MC1_LABELS: &str = "mc1_labels";
pub const MC2_LABELS: &str = "mc2_labels";

/// Source datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    MedNli,
    TruthfulQa,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::MedNli => "MedNLI",
            Dataset::TruthfulQa => "TruthfulQA",
        }
    }

    /// The evaluation task run against this dataset.
    pub fn evaluation_task(&self) -> TaskKind {
        match self {
            Dataset::MedNli => TaskKind::Entailment,
            Dataset::TruthfulQa => TaskKind::MultipleChoice,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a file job does with each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Three-way NLI classification scored against `gold_label`.
    Entailment,
    /// MC1/MC2 answer selection scored against `mc1_labels`/`mc2_labels`.
    MultipleChoice,
    /// Korean source text rewritten into a dialect.
    Translation(Dataset),
}

impl TaskKind {
    pub fn dataset(&self) -> Dataset {
        match self {
            TaskKind::Entailment => Dataset::MedNli,
            TaskKind::MultipleChoice => Dataset::TruthfulQa,
            TaskKind::Translation(dataset) => *dataset,
        }
    }

    /// Result columns appended to the input header by evaluation tasks.
    pub fn appended_columns(&self) -> &'static [&'static str] {
        match self {
            TaskKind::Entailment => &[AI_ANSWER, RESULT],
            TaskKind::MultipleChoice => &[AI_ANSWER_MC1, MC1_RESULT, AI_ANSWER_MC2, MC2_RESULT],
            TaskKind::Translation(_) => &[],
        }
    }

    /// Whether an input without data rows counts as a successful file.
    ///
    /// Entailment files treat zero rows as "nothing to do" and report failure.
    pub fn empty_input_succeeds(&self) -> bool {
        !matches!(self, TaskKind::Entailment)
    }

    /// Dataset identifier used in logs and the batch summary.
    pub fn dataset_id(&self, tag: &DialectTag) -> String {
        match self {
            TaskKind::Entailment => format!("MedNLI_{}", tag.spelling()),
            TaskKind::MultipleChoice => format!("TruthfulQA_{}", tag.dialect()),
            TaskKind::Translation(dataset) => {
                format!("Translate_{}_{}", dataset.name(), tag.dialect())
            }
        }
    }
}

/// Output header of an evaluation file: input columns plus result columns
/// that are not already present.
pub fn evaluation_header(input: &[String], task: TaskKind) -> Vec<String> {
    let mut header = input.to_vec();
    for column in task.appended_columns() {
        if !header.iter().any(|h| h == column) {
            header.push(column.to_string());
        }
    }
    header
}

/// One column of a translated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationColumn {
    /// Copied unchanged from the source row.
    Passthrough(&'static str),
    /// `source` translated into the dialect, written as `<prefix>_<Dialect>`.
    Translate {
        source: &'static str,
        prefix: &'static str,
    },
    /// Empty placeholder filled later by an evaluation run.
    Blank(&'static str),
}

impl TranslationColumn {
    pub fn header(&self, tag: &DialectTag) -> String {
        match self {
            TranslationColumn::Passthrough(name) | TranslationColumn::Blank(name) => name.to_string(),
            TranslationColumn::Translate { prefix, .. } => tag.column(prefix),
        }
    }
}

/// Column layout written by the translator for a dataset.
pub fn translation_layout(dataset: Dataset) -> &'static [TranslationColumn] {
    use TranslationColumn::*;

    const MEDNLI: &[TranslationColumn] = &[
        Passthrough(GOLD_LABEL),
        Translate {
            source: "sentence1_ko",
            prefix: "sentence1",
        },
        Translate {
            source: "sentence2_ko",
            prefix: "sentence2",
        },
        Blank(AI_ANSWER),
        Blank(RESULT),
    ];

    const TRUTHFULQA: &[TranslationColumn] = &[
        Translate {
            source: "question_ko",
            prefix: "question",
        },
        Translate {
            source: "mc1_choices_ko",
            prefix: "mc1_choices",
        },
        Passthrough(MC1_LABELS),
        Translate {
            source: "mc2_choices_ko",
            prefix: "mc2_choices",
        },
        Passthrough(MC2_LABELS),
        Blank(AI_ANSWER_MC1),
        Blank(MC1_RESULT),
        Blank(AI_ANSWER_MC2),
        Blank(MC2_RESULT),
    ];

    match dataset {
        Dataset::MedNli => MEDNLI,
        Dataset::TruthfulQa => TRUTHFULQA,
    }
}

/// Output header of a translated file.
pub fn translation_header(dataset: Dataset, tag: &DialectTag) -> Vec<String> {
    translation_layout(dataset)
        .iter()
        .map(|c| c.header(tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_evaluation_header_appends_missing_columns() {
        let input = strings(&["gold_label", "sentence1_jeju", "sentence2_jeju"]);
        assert_eq!(
            evaluation_header(&input, TaskKind::Entailment),
            strings(&["gold_label", "sentence1_jeju", "sentence2_jeju", "ai_answer", "result"])
        );
    }

    #[test]
    fn test_evaluation_header_keeps_existing_columns() {
        let input = strings(&["question_Jeju", "ai_answer_mc1", "mc1_result"]);
        assert_eq!(
            evaluation_header(&input, TaskKind::MultipleChoice),
            strings(&[
                "question_Jeju",
                "ai_answer_mc1",
                "mc1_result",
                "ai_answer_mc2",
                "mc2_result"
            ])
        );
    }

    #[test]
    fn test_dataset_ids() {
        let tag = DialectTag::parse("jeonra").unwrap();
        assert_eq!(TaskKind::Entailment.dataset_id(&tag), "MedNLI_jeonra");
        assert_eq!(TaskKind::MultipleChoice.dataset_id(&tag), "TruthfulQA_Jeolla");
        assert_eq!(
            TaskKind::Translation(Dataset::MedNli).dataset_id(&tag),
            "Translate_MedNLI_Jeolla"
        );
    }

    #[test]
    fn test_empty_input_convention() {
        assert!(!TaskKind::Entailment.empty_input_succeeds());
        assert!(TaskKind::MultipleChoice.empty_input_succeeds());
        assert!(TaskKind::Translation(Dataset::TruthfulQa).empty_input_succeeds());
    }

    #[test]
    fn test_translation_headers() {
        let tag = DialectTag::canonical(Dialect::Jeju);
        assert_eq!(
            translation_header(Dataset::MedNli, &tag),
            strings(&["gold_label", "sentence1_Jeju", "sentence2_Jeju", "ai_answer", "result"])
        );
        assert_eq!(
            translation_header(Dataset::TruthfulQa, &tag),
            strings(&[
                "question_Jeju",
                "mc1_choices_Jeju",
                "mc1_labels",
                "mc2_choices_Jeju",
                "mc2_labels",
                "ai_answer_mc1",
                "mc1_result",
                "ai_answer_mc2",
                "mc2_result"
            ])
        );
    }
}
