//! Gold label arrays stored as text in CSV cells, e.g. `[0, 1, 0, 1]`.

use thiserror::Error;

/// Errors from [`parse_label_array`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelParseError {
    #[error("Label array must be enclosed in brackets: '{0}'")]
    Unbracketed(String),

    #[error("Invalid label element '{element}' in '{input}'")]
    InvalidElement { element: String, input: String },
}

/// Parse a small integer array literal.
///
/// Accepts `[0, 1, 0]`, numpy-style `[0 1 0]`, and `[]`. Elements must be
/// written as plain decimal digits; anything else is rejected rather than guessed.
pub fn parse_label_array(input: &str) -> Result<Vec<u8>, LabelParseError> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| LabelParseError::Unbracketed(input.to_string()))?;

    let mut labels = Vec::new();
    for element in inner.split(|c: char| c == ',' || c.is_whitespace()) {
        if element.is_empty() {
            continue;
        }
        if !element.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LabelParseError::InvalidElement {
                element: element.to_string(),
                input: input.to_string(),
            });
        }
        let value = element
            .parse::<u8>()
            .map_err(|_| LabelParseError::InvalidElement {
                element: element.to_string(),
                input: input.to_string(),
            })?;
        labels.push(value);
    }

    // With commas, every comma-separated slot must hold an element.
    if inner.contains(',') && inner.split(',').any(|part| part.trim().is_empty()) {
        return Err(LabelParseError::InvalidElement {
            element: String::new(),
            input: input.to_string(),
        });
    }

    Ok(labels)
}

/// Zero-based indices whose gold value is 1.
pub fn correct_indices(labels: &[u8]) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == 1)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_list() {
        assert_eq!(parse_label_array("[0, 1, 0, 1]").unwrap(), vec![0, 1, 0, 1]);
        assert_eq!(parse_label_array("  [1,0,0]  ").unwrap(), vec![1, 0, 0]);
    }

    #[test]
    fn test_parse_numpy_repr() {
        assert_eq!(parse_label_array("[1 0 0 0]").unwrap(), vec![1, 0, 0, 0]);
        assert_eq!(parse_label_array("[1\n 0]").unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_label_array("[]").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_label_array("[ ]").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            parse_label_array("0, 1"),
            Err(LabelParseError::Unbracketed(_))
        ));
        assert!(matches!(
            parse_label_array("[0, one]"),
            Err(LabelParseError::InvalidElement { .. })
        ));
        assert!(parse_label_array("[0, -1]").is_err());
        assert!(parse_label_array("[+1, 0]").is_err());
        assert!(parse_label_array("[1.0, 0]").is_err());
        assert!(parse_label_array("[0,,1]").is_err());
        assert!(parse_label_array("[0, 1,]").is_err());
        assert!(parse_label_array("[,]").is_err());
        assert!(parse_label_array("").is_err());
    }

    #[test]
    fn test_correct_indices() {
        assert_eq!(correct_indices(&[0, 1, 0, 1]), vec![1, 3]);
        assert!(correct_indices(&[0, 0]).is_empty());
    }
}
