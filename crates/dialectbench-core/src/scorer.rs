//! Correctness verdicts against gold labels.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::labels::{correct_indices, parse_label_array, LabelParseError};
use crate::parser::{ChoiceAnswer, CHOICE_LETTERS};

/// Exact match between a cleaned answer and the gold label.
pub fn score_label(answer: &str, gold: &str) -> bool {
    answer == gold
}

/// Zero-based index of a choice letter (`A` → 0).
pub fn letter_index(letter: char) -> Option<usize> {
    CHOICE_LETTERS.iter().position(|c| *c == letter)
}

/// MC1 verdict: the chosen index must hold a 1 in the gold array.
pub fn score_single_choice(choice: Option<char>, gold: &[u8]) -> bool {
    choice
        .and_then(letter_index)
        .and_then(|idx| gold.get(idx))
        .map(|v| *v == 1)
        .unwrap_or(false)
}

/// MC2 verdict: the selected indices must equal the gold-positive indices.
/// There is no partial credit.
pub fn score_selected_indices(selected: &BTreeSet<usize>, gold: &[u8]) -> bool {
    let expected: BTreeSet<usize> = correct_indices(gold).into_iter().collect();
    *selected == expected
}

/// MC2 verdict from letters as parsed from a reply.
pub fn score_multiple_choice(letters: &[char], gold: &[u8]) -> bool {
    let selected: BTreeSet<usize> = letters.iter().filter_map(|c| letter_index(*c)).collect();
    score_selected_indices(&selected, gold)
}

/// Verdicts for one multiple-choice row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceVerdict {
    pub mc1: bool,
    pub mc2: bool,
}

/// Score a parsed reply against the textual gold arrays of a row.
///
/// A malformed gold literal makes only its own verdict false; the error is
/// returned alongside so the caller can report it.
pub fn score_choice_answer(
    answer: &ChoiceAnswer,
    mc1_labels: &str,
    mc2_labels: &str,
) -> (ChoiceVerdict, Vec<LabelParseError>) {
    let mut errors = Vec::new();

    let mc1 = match parse_label_array(mc1_labels) {
        Ok(gold) => score_single_choice(answer.mc1, &gold),
        Err(e) => {
            errors.push(e);
            false
        }
    };

    // An empty selection is the UNKNOWN answer and never correct.
    let mc2 = match parse_label_array(mc2_labels) {
        Ok(gold) => !answer.mc2.is_empty() && score_multiple_choice(&answer.mc2, &gold),
        Err(e) => {
            errors.push(e);
            false
        }
    };

    (ChoiceVerdict { mc1, mc2 }, errors)
}
