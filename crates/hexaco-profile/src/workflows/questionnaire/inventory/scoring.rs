use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::items::{questions, Question};
use super::{Dimension, ResponseSet, LIKERT_MAX, LIKERT_MIN};

/// Per-dimension scores on a 0-100 scale.
///
/// A dimension with no answered items scores 0 and is also listed in
/// `unanswered`, so a genuine floor can be told apart from missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub scores: BTreeMap<Dimension, f64>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unanswered: BTreeSet<Dimension>,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        self.scores.get(&dimension).copied().unwrap_or(0.0)
    }

    pub fn is_answered(&self, dimension: Dimension) -> bool {
        !self.unanswered.contains(&dimension)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ordered()
            .into_iter()
            .map(move |dimension| (dimension, self.get(dimension)))
    }
}

/// Stateless scorer over an item bank.
#[derive(Debug, Clone, Copy)]
pub struct TraitScoringEngine {
    questions: &'static [Question],
}

impl Default for TraitScoringEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl TraitScoringEngine {
    pub fn standard() -> Self {
        Self::with_questions(questions())
    }

    pub fn with_questions(questions: &'static [Question]) -> Self {
        Self { questions }
    }

    /// Averages the (reverse-keyed where needed) answers per dimension and
    /// maps the 1-5 mean onto 0-100. Unanswered items are skipped entirely.
    pub fn score(&self, responses: &ResponseSet) -> DimensionScores {
        let mut sums = [0.0_f64; 6];
        let mut counts = [0_u32; 6];

        for question in self.questions {
            let Some(raw) = responses.get(question.id) else {
                continue;
            };
            let effective = if question.reversed {
                (LIKERT_MAX + LIKERT_MIN) as f64 - raw as f64
            } else {
                raw as f64
            };
            let slot = question.dimension.slot();
            sums[slot] += effective;
            counts[slot] += 1;
        }

        let mut scores = BTreeMap::new();
        let mut unanswered = BTreeSet::new();
        for dimension in Dimension::ordered() {
            let slot = dimension.slot();
            let score = if counts[slot] > 0 {
                (sums[slot] / counts[slot] as f64 - 1.0) * 25.0
            } else {
                unanswered.insert(dimension);
                0.0
            };
            scores.insert(dimension, score);
        }

        DimensionScores { scores, unanswered }
    }
}
