//! Korean regional dialects and the spellings datasets use for them.
//!
//! Dataset files are not consistent about how a dialect is written in their
//! column names (`sentence1_jeonra`, `question_Jeolla`, ...). A [`DialectTag`]
//! keeps the exact spelling next to the resolved [`Dialect`] so column lookups
//! use what the file actually contains.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    /// Leading alphabetic word after the `truthfulqa_` prefix.
    static ref TRUTHFULQA_FILE_DIALECT: Regex =
        Regex::new(r"(?i)^truthfulqa_([a-z]+)").unwrap();
}

/// Errors when resolving a dialect spelling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    #[error("Unknown dialect spelling: '{0}'")]
    Unknown(String),
}

/// The four target dialect regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dialect {
    Jeju,
    Gyeongsang,
    Jeolla,
    Chungcheong,
}

impl Dialect {
    /// All dialects in canonical order.
    pub const ALL: [Dialect; 4] = [
        Dialect::Jeju,
        Dialect::Gyeongsang,
        Dialect::Jeolla,
        Dialect::Chungcheong,
    ];

    /// Canonical English spelling, also used for generated column names.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Dialect::Jeju => "Jeju",
            Dialect::Gyeongsang => "Gyeongsang",
            Dialect::Jeolla => "Jeolla",
            Dialect::Chungcheong => "Chungcheong",
        }
    }

    /// Region name as written in Korean prompts.
    pub fn korean_region(&self) -> &'static str {
        match self {
            Dialect::Jeju => "제주도",
            Dialect::Gyeongsang => "경상도",
            Dialect::Jeolla => "전라도",
            Dialect::Chungcheong => "충청도",
        }
    }

    fn from_spelling(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "jeju" => Some(Dialect::Jeju),
            "gyeongsang" | "kyungsang" => Some(Dialect::Gyeongsang),
            "jeolla" | "jeonra" | "jeollra" => Some(Dialect::Jeolla),
            "chungcheong" | "choongchung" | "chungchung" => Some(Dialect::Chungcheong),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_spelling(s).ok_or_else(|| DialectError::Unknown(s.to_string()))
    }
}

/// A dialect plus the exact spelling one file uses in its column names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialectTag {
    dialect: Dialect,
    spelling: String,
}

impl DialectTag {
    /// Resolve a spelling, keeping it verbatim for column lookups.
    pub fn parse(spelling: impl Into<String>) -> Result<Self, DialectError> {
        let spelling = spelling.into();
        let dialect = spelling.parse::<Dialect>()?;
        Ok(Self { dialect, spelling })
    }

    /// Tag that uses the canonical spelling.
    pub fn canonical(dialect: Dialect) -> Self {
        Self {
            dialect,
            spelling: dialect.canonical_name().to_string(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Spelling used as the column suffix.
    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    /// Column name with this tag as suffix, e.g. `sentence1_jeonra`.
    pub fn column(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.spelling)
    }

    /// Extract the dialect from a TruthfulQA file name such as
    /// `truthfulqa_Jeju.GPT-5.csv`. The spelling is capitalised.
    pub fn from_truthfulqa_file_name(file_name: &str) -> Result<Self, DialectError> {
        let raw = TRUTHFULQA_FILE_DIALECT
            .captures(file_name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| DialectError::Unknown(file_name.to_string()))?;

        let mut chars = raw.chars();
        let capitalised = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(|c| c.to_lowercase()))
                .collect(),
            None => String::new(),
        };
        Self::parse(capitalised)
    }
}

impl fmt::Display for DialectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}
