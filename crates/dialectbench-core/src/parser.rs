//! Heuristic extraction of structured answers from free-text model replies.
//!
//! These are not grammars. The classifier checks substrings in a fixed
//! priority order and the multiple-choice reader scans for line prefixes;
//! anything it cannot find falls back to a documented default.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Letters a multiple-choice answer may use.
pub const CHOICE_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

pub const UNKNOWN: &str = "UNKNOWN";

const MC1_PREFIX: &str = "ai_answer_mc1:";
const MC1_RESULT_PREFIX: &str = "mc1_result:";
const MC2_PREFIX: &str = "ai_answer_mc2:";
const MC2_RESULT_PREFIX: &str = "mc2_result:";

/// NLI label vocabulary, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NliLabel {
    Entailment,
    Neutral,
    Contradiction,
    Unknown,
}

impl NliLabel {
    const PRIORITY: [NliLabel; 3] = [NliLabel::Entailment, NliLabel::Neutral, NliLabel::Contradiction];

    pub fn as_str(&self) -> &'static str {
        match self {
            NliLabel::Entailment => "entailment",
            NliLabel::Neutral => "neutral",
            NliLabel::Contradiction => "contradiction",
            NliLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NliLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduce a classification reply to one label.
///
/// The reply is lower-cased and checked for `entailment`, then `neutral`,
/// then `contradiction`. The first hit wins regardless of where it appears,
/// so "not entailment but contradiction" yields `entailment`.
pub fn parse_classification(response: &str) -> NliLabel {
    let lowered = response.trim().to_lowercase();
    NliLabel::PRIORITY
        .into_iter()
        .find(|label| lowered.contains(label.as_str()))
        .unwrap_or(NliLabel::Unknown)
}

/// Fields read from a multiple-choice reply.
///
/// Defaults when a line is absent: `mc1 = None` (`UNKNOWN`),
/// `mc1_reported = false`, `mc2 = []` (`['UNKNOWN']`), `mc2_reported = false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceAnswer {
    /// Single MC1 letter.
    pub mc1: Option<char>,
    /// The model's own claim about MC1 correctness.
    pub mc1_reported: bool,
    /// MC2 letters in order of appearance, duplicates kept.
    pub mc2: Vec<char>,
    /// The model's own claim about MC2 correctness.
    pub mc2_reported: bool,
}

impl ChoiceAnswer {
    /// Cell value for `ai_answer_mc1`.
    pub fn mc1_cell(&self) -> String {
        self.mc1
            .map(|c| c.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Cell value for `ai_answer_mc2`.
    pub fn mc2_cell(&self) -> String {
        if self.mc2.is_empty() {
            format!("['{}']", UNKNOWN)
        } else {
            format_letter_list(&self.mc2)
        }
    }
}

/// Render letters as a list literal, e.g. `['A', 'C']`.
pub fn format_letter_list(letters: &[char]) -> String {
    let items: Vec<String> = letters.iter().map(|c| format!("'{}'", c)).collect();
    format!("[{}]", items.join(", "))
}

/// Render a verdict the way result columns spell it (`True`/`False`).
pub fn verdict_cell(verdict: bool) -> &'static str {
    if verdict {
        "True"
    } else {
        "False"
    }
}

fn is_choice_letter(c: &char) -> bool {
    CHOICE_LETTERS.contains(c)
}

fn parse_reported(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Read the four-line multiple-choice reply format.
///
/// Lines are trimmed and matched by case-sensitive prefix. For MC1 the first
/// A-D character of the value is taken; for MC2 every A-D character is
/// collected. Result lines count only when they say true or false.
pub fn parse_multiple_choice(response: &str) -> ChoiceAnswer {
    let mut answer = ChoiceAnswer::default();

    for line in response.trim().lines() {
        let line = line.trim();
        let value = |prefix: &str| line[prefix.len()..].trim().to_string();

        if line.starts_with(MC1_PREFIX) {
            if let Some(letter) = value(MC1_PREFIX).chars().find(is_choice_letter) {
                answer.mc1 = Some(letter);
            }
        } else if line.starts_with(MC1_RESULT_PREFIX) {
            if let Some(reported) = parse_reported(&value(MC1_RESULT_PREFIX)) {
                answer.mc1_reported = reported;
            }
        } else if line.starts_with(MC2_PREFIX) {
            let letters: Vec<char> = value(MC2_PREFIX).chars().filter(is_choice_letter).collect();
            if !letters.is_empty() {
                answer.mc2 = letters;
            }
        } else if line.starts_with(MC2_RESULT_PREFIX) {
            if let Some(reported) = parse_reported(&value(MC2_RESULT_PREFIX)) {
                answer.mc2_reported = reported;
            }
        }
    }

    answer
}
