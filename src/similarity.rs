//! Field similarity functions used to score candidate pairs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use strsim::jaro_winkler;

use crate::error::ResolutionError;
use crate::record::Record;

/// Weight of the title component when both author fields are present.
pub const TITLE_WEIGHT: f64 = 0.7;
/// Weight of the author component when both author fields are present.
pub const AUTHOR_WEIGHT: f64 = 0.3;

const TRIGRAM_LEN: usize = 3;

/// Case-sensitive whitespace tokenization.
pub fn tokenize(text: &str) -> HashSet<&str> {
    text.split_whitespace().collect()
}

/// |A∩B| / |A∪B|, with two empty sets scoring 0 rather than being undefined.
pub fn jaccard_similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Overlapping 3-character substrings. Strings shorter than three characters
/// have no trigrams.
pub fn trigrams(text: &str) -> HashSet<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .windows(TRIGRAM_LEN)
        .map(|window| window.iter().collect())
        .collect()
}

/// Jaccard similarity over character trigrams.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    jaccard_similarity(&trigrams(a), &trigrams(b))
}

/// Weighted title/author similarity.
///
/// When either author field is missing the score is the title Jaccard alone;
/// otherwise it is `0.7 * title_jaccard + 0.3 * author_trigram`.
pub fn combined_similarity(
    title_a: &str,
    title_b: &str,
    authors_a: Option<&str>,
    authors_b: Option<&str>,
) -> f64 {
    let title_score = jaccard_similarity(&tokenize(title_a), &tokenize(title_b));
    weigh_with_authors(title_score, authors_a, authors_b)
}

fn weigh_with_authors(title_score: f64, authors_a: Option<&str>, authors_b: Option<&str>) -> f64 {
    match (authors_a, authors_b) {
        (Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            TITLE_WEIGHT * title_score + AUTHOR_WEIGHT * trigram_similarity(a, b)
        }
        _ => title_score,
    }
}

/// Named scoring functions selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum SimilarityMethod {
    /// Title Jaccard blended with author trigrams (`combined_similarity`).
    #[default]
    Combined,
    /// Title Jaccard only; authors ignored.
    TitleJaccard,
    /// Jaro-Winkler on titles blended with author trigrams, same fallback.
    JaroWinkler,
}

impl SimilarityMethod {
    pub const ALL: [SimilarityMethod; 3] = [
        SimilarityMethod::Combined,
        SimilarityMethod::TitleJaccard,
        SimilarityMethod::JaroWinkler,
    ];

    /// Scores two records. Pure function of their title and author fields.
    pub fn score(&self, left: &Record, right: &Record) -> f64 {
        let authors_left = left.authors.as_deref();
        let authors_right = right.authors.as_deref();
        match self {
            SimilarityMethod::Combined => {
                combined_similarity(&left.title, &right.title, authors_left, authors_right)
            }
            SimilarityMethod::TitleJaccard => {
                jaccard_similarity(&tokenize(&left.title), &tokenize(&right.title))
            }
            SimilarityMethod::JaroWinkler => weigh_with_authors(
                jaro_winkler(&left.title, &right.title),
                authors_left,
                authors_right,
            ),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SimilarityMethod::Combined => "Jaccard",
            SimilarityMethod::TitleJaccard => "TitleJaccard",
            SimilarityMethod::JaroWinkler => "JaroWinkler",
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SimilarityMethod {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "jaccard" | "combined" => Ok(SimilarityMethod::Combined),
            "titlejaccard" => Ok(SimilarityMethod::TitleJaccard),
            "jarowinkler" => Ok(SimilarityMethod::JaroWinkler),
            _ => Err(ResolutionError::configuration(format!(
                "unknown matching method '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for SimilarityMethod {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SimilarityMethod> for String {
    fn from(method: SimilarityMethod) -> Self {
        method.name().to_string()
    }
}
