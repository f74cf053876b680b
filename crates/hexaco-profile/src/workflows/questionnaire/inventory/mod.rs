//! The fixed 24-item HEXACO inventory and its scoring.
//!
//! Items are static data; responses are the only per-respondent state and are
//! kept as a sparse [`ResponseSet`] so partially answered sessions can be
//! stored and resumed.

mod items;
mod scoring;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use items::{question, questions, LikertAnchor, Question, ITEM_COUNT, LIKERT_SCALE};
pub use scoring::{DimensionScores, TraitScoringEngine};

pub const LIKERT_MIN: u8 = 1;
pub const LIKERT_MAX: u8 = 5;

/// One of the six HEXACO trait axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    H,
    E,
    X,
    A,
    C,
    O,
}

impl Dimension {
    pub const fn ordered() -> [Self; 6] {
        [Self::H, Self::E, Self::X, Self::A, Self::C, Self::O]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::E => "E",
            Self::X => "X",
            Self::A => "A",
            Self::C => "C",
            Self::O => "O",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::H => "Honesty-Humility",
            Self::E => "Emotionality",
            Self::X => "Extraversion",
            Self::A => "Agreeableness",
            Self::C => "Conscientiousness",
            Self::O => "Openness to Experience",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::H => 0,
            Self::E => 1,
            Self::X => 2,
            Self::A => 3,
            Self::C => 4,
            Self::O => 5,
        }
    }
}

/// Sparse question-id to Likert value map collected while the respondent answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet(BTreeMap<String, u8>);

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer without range checks; the wizard validates before calling.
    pub fn insert(&mut self, question_id: impl Into<String>, value: u8) {
        self.0.insert(question_id.into(), value);
    }

    pub fn get(&self, question_id: &str) -> Option<u8> {
        self.0.get(question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True once every item in the bank has an answer.
    pub fn is_complete(&self) -> bool {
        self.unanswered().is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(id, value)| (id.as_str(), *value))
    }

    /// Item ids from the bank that have no answer yet, in presentation order.
    pub fn unanswered(&self) -> Vec<&'static str> {
        questions()
            .iter()
            .filter(|question| !self.0.contains_key(question.id))
            .map(|question| question.id)
            .collect()
    }
}

impl FromIterator<(String, u8)> for ResponseSet {
    fn from_iter<T: IntoIterator<Item = (String, u8)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
