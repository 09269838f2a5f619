//! Dataset rows keyed by header name.

use std::sync::Arc;

use thiserror::Error;

/// Per-row failures. These never abort a file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("No column starting with '{0}'")]
    MissingColumnPrefix(String),

    #[error("No row prompt for task: {0}")]
    Unsupported(String),
}

/// One CSV record viewed as a column-name → value mapping.
///
/// Headers are shared between all rows of a file. Records shorter than the
/// header read as empty strings for the missing cells.
#[derive(Debug, Clone)]
pub struct DatasetRow {
    headers: Arc<Vec<String>>,
    values: Vec<String>,
}

impl DatasetRow {
    pub fn new(headers: Arc<Vec<String>>, mut values: Vec<String>) -> Self {
        if values.len() < headers.len() {
            values.resize(headers.len(), String::new());
        }
        Self { headers, values }
    }

    /// Build a row from `(column, value)` pairs. Mostly useful in tests.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (headers, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(Arc::new(headers), values)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    /// Value of a column that must be present.
    pub fn require(&self, column: &str) -> Result<&str, RowError> {
        self.get(column)
            .ok_or_else(|| RowError::MissingColumn(column.to_string()))
    }

    /// First column whose lower-cased name starts with `prefix`.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<(&str, &str)> {
        let prefix = prefix.to_lowercase();
        self.headers
            .iter()
            .zip(self.values.iter())
            .find(|(h, _)| h.to_lowercase().starts_with(&prefix))
            .map(|(h, v)| (h.as_str(), v.as_str()))
    }

    /// Exact column if present, otherwise the first prefix match.
    pub fn require_exact_or_prefix(&self, exact: &str, prefix: &str) -> Result<&str, RowError> {
        if let Some(value) = self.get(exact) {
            return Ok(value);
        }
        self.find_by_prefix(prefix)
            .map(|(_, v)| v)
            .ok_or_else(|| RowError::MissingColumnPrefix(prefix.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_require() {
        let row = DatasetRow::from_pairs([("gold_label", "neutral"), ("sentence1_jeju", "s1")]);
        assert_eq!(row.get("gold_label"), Some("neutral"));
        assert_eq!(row.require("sentence1_jeju").unwrap(), "s1");
        assert_eq!(
            row.require("sentence2_jeju"),
            Err(RowError::MissingColumn("sentence2_jeju".to_string()))
        );
    }

    #[test]
    fn test_short_record_is_padded() {
        let headers = Arc::new(vec!["a".to_string(), "b".to_string()]);
        let row = DatasetRow::new(headers, vec!["1".to_string()]);
        assert_eq!(row.get("b"), Some(""));
    }

    #[test]
    fn test_prefix_lookup_is_case_insensitive() {
        let row = DatasetRow::from_pairs([
            ("id", "7"),
            ("Question_Jeju", "q"),
            ("mc1_choices_Jeju", "A. x"),
        ]);
        assert_eq!(row.find_by_prefix("question_"), Some(("Question_Jeju", "q")));
        assert_eq!(row.find_by_prefix("mc2_choice"), None);
    }

    #[test]
    fn test_exact_column_wins_over_prefix() {
        let row = DatasetRow::from_pairs([("question_ko", "korean"), ("question_Jeju", "jeju")]);
        assert_eq!(
            row.require_exact_or_prefix("question_Jeju", "question_").unwrap(),
            "jeju"
        );
        assert_eq!(
            row.require_exact_or_prefix("question_Jeolla", "question_").unwrap(),
            "korean"
        );
        assert_eq!(
            row.require_exact_or_prefix("mc1_choices_Jeju", "mc1_choice"),
            Err(RowError::MissingColumnPrefix("mc1_choice".to_string()))
        );
    }
}
