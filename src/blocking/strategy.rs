use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ResolutionError;
use crate::record::Record;

/// Partition rules that decide which (A, B) pairs reach the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BlockingStrategy {
    /// Every (a, b) pair. Baseline only.
    CrossProduct,
    /// Same first title character.
    FirstLetterTitle,
    /// Same first title character OR same last title character.
    FirstOrLastLetterTitle,
    /// Same publication year.
    Year,
}

impl BlockingStrategy {
    pub const ALL: [BlockingStrategy; 4] = [
        BlockingStrategy::CrossProduct,
        BlockingStrategy::FirstLetterTitle,
        BlockingStrategy::FirstOrLastLetterTitle,
        BlockingStrategy::Year,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BlockingStrategy::CrossProduct => "CrossProduct",
            BlockingStrategy::FirstLetterTitle => "FirstLetterTitle",
            BlockingStrategy::FirstOrLastLetterTitle => "FirstOrLastLetterTitle",
            BlockingStrategy::Year => "Year",
        }
    }
}

impl fmt::Display for BlockingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BlockingStrategy {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "crossproduct" | "none" => Ok(BlockingStrategy::CrossProduct),
            "firstlettertitle" => Ok(BlockingStrategy::FirstLetterTitle),
            "firstorlastlettertitle" => Ok(BlockingStrategy::FirstOrLastLetterTitle),
            "year" => Ok(BlockingStrategy::Year),
            _ => Err(ResolutionError::configuration(format!(
                "unknown blocking method '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for BlockingStrategy {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockingStrategy> for String {
    fn from(strategy: BlockingStrategy) -> Self {
        strategy.name().to_string()
    }
}

/// The key values that admitted a pair. Debugging aid only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockingKey {
    None,
    FirstLetter(char),
    /// The side(s) that matched; at least one is set.
    FirstOrLastLetter {
        first: Option<char>,
        last: Option<char>,
    },
    Year(i32),
}

pub(crate) fn first_letter(record: &Record) -> Option<char> {
    record.title.chars().next()
}

pub(crate) fn last_letter(record: &Record) -> Option<char> {
    record.title.chars().next_back()
}
