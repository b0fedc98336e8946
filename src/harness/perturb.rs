use rand::Rng;
use std::fmt;

use crate::record::{Dataset, Record};

/// Synthetic edits applied to a whole dataset to produce a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Perturbation {
    /// Every year moves by `-(changes / 2)`.
    YearShift,
    /// `changes` random lowercase letters written over the author field.
    AuthorSubstitution,
    /// `changes` random lowercase letters written over the title.
    TitleSubstitution,
}

impl Perturbation {
    /// Rotation order for successive variants of one file.
    pub const ROTATION: [Perturbation; 3] = [
        Perturbation::YearShift,
        Perturbation::AuthorSubstitution,
        Perturbation::TitleSubstitution,
    ];

    pub fn for_variant(index: usize) -> Self {
        Self::ROTATION[index % Self::ROTATION.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Perturbation::YearShift => "year",
            Perturbation::AuthorSubstitution => "author",
            Perturbation::TitleSubstitution => "title",
        }
    }

    /// Four-letter tag used in variant file names.
    pub fn short_name(&self) -> &'static str {
        match self {
            Perturbation::YearShift => "year",
            Perturbation::AuthorSubstitution => "auth",
            Perturbation::TitleSubstitution => "titl",
        }
    }
}

impl fmt::Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Overwrites `changes` randomly chosen characters with random `a..=z`.
///
/// Positions may repeat. Empty strings are returned unchanged.
pub fn substitute_characters<R: Rng>(text: &str, changes: usize, rng: &mut R) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    for _ in 0..changes {
        let position = rng.random_range(0..chars.len());
        chars[position] = char::from(b'a' + rng.random_range(0..26u8));
    }
    chars.into_iter().collect()
}

/// Builds a perturbed copy of `dataset`. Ids, tag and external ids are kept.
///
/// Absent author fields stay absent.
pub fn perturb_dataset<R: Rng>(
    dataset: &Dataset,
    perturbation: Perturbation,
    changes: usize,
    rng: &mut R,
) -> Dataset {
    let year_shift = -((changes / 2) as i32);
    dataset.map_records(|record| {
        let mut record: Record = record.clone();
        match perturbation {
            Perturbation::YearShift => record.year += year_shift,
            Perturbation::AuthorSubstitution => {
                record.authors = record
                    .authors
                    .as_deref()
                    .map(|authors| substitute_characters(authors, changes, rng));
            }
            Perturbation::TitleSubstitution => {
                record.title = substitute_characters(&record.title, changes, rng);
            }
        }
        record
    })
}
