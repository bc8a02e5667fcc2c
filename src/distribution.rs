//! Sentiment classes and per-sentence probability distributions.
//!
//! Scores are carried as a [`SentimentDistribution`]: five probabilities in
//! class order, checked to be non-negative and to sum to one. The class order
//! is fixed from most negative to most positive and matches the index layout
//! used by pretrained parameter bundles.

use crate::error::{PipelineError, Result};

/// Number of sentiment classes.
pub const NUM_CLASSES: usize = 5;

/// Sum tolerance accepted when validating raw probabilities.
const SUM_TOLERANCE: f32 = 1e-4;

/// One of the five ordered sentiment classes.
///
/// The discriminants match the class indices of a [`SentimentDistribution`]:
/// `VeryNegative = 0` through `VeryPositive = 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentClass {
    /// Strongly negative sentiment (index 0).
    VeryNegative,
    /// Negative sentiment (index 1).
    Negative,
    /// Neutral sentiment (index 2).
    Neutral,
    /// Positive sentiment (index 3).
    Positive,
    /// Strongly positive sentiment (index 4).
    VeryPositive,
}

impl SentimentClass {
    /// All classes in index order.
    pub const ALL: [SentimentClass; NUM_CLASSES] = [
        SentimentClass::VeryNegative,
        SentimentClass::Negative,
        SentimentClass::Neutral,
        SentimentClass::Positive,
        SentimentClass::VeryPositive,
    ];

    /// The class index (0 to 4).
    pub fn index(self) -> usize {
        match self {
            SentimentClass::VeryNegative => 0,
            SentimentClass::Negative => 1,
            SentimentClass::Neutral => 2,
            SentimentClass::Positive => 3,
            SentimentClass::VeryPositive => 4,
        }
    }

    /// Look up a class by index.
    pub fn from_index(index: usize) -> Result<Self> {
        SentimentClass::ALL
            .get(index)
            .copied()
            .ok_or_else(|| PipelineError::Unexpected(format!("invalid class index {index}")))
    }

    /// The external label string, e.g. `"Very Negative"`.
    pub fn label(self) -> &'static str {
        match self {
            SentimentClass::VeryNegative => "Very Negative",
            SentimentClass::Negative => "Negative",
            SentimentClass::Neutral => "Neutral",
            SentimentClass::Positive => "Positive",
            SentimentClass::VeryPositive => "Very Positive",
        }
    }
}

impl std::fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A probability distribution over the five sentiment classes.
///
/// Entries are indexed by [`SentimentClass`], lie in `[0, 1]`, and sum to 1
/// within floating-point tolerance. Construction validates both invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentDistribution([f32; NUM_CLASSES]);

impl SentimentDistribution {
    /// Build a distribution from raw probabilities, validating the invariants.
    pub fn from_probabilities(probs: [f32; NUM_CLASSES]) -> Result<Self> {
        for (i, &p) in probs.iter().enumerate() {
            if !p.is_finite() || !(0.0..=1.0 + SUM_TOLERANCE).contains(&p) {
                return Err(PipelineError::Unexpected(format!(
                    "probability {p} at class index {i} is outside [0, 1]"
                )));
            }
        }
        let sum: f32 = probs.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(PipelineError::Unexpected(format!(
                "probabilities sum to {sum}, expected 1.0"
            )));
        }
        Ok(Self(probs))
    }

    /// The probability of a single class.
    pub fn get(&self, class: SentimentClass) -> f32 {
        self.0[class.index()]
    }

    /// All five probabilities in class order.
    pub fn probabilities(&self) -> &[f32; NUM_CLASSES] {
        &self.0
    }

    /// The most probable class. Ties resolve to the lowest class index:
    /// scanning `VeryNegative` through `VeryPositive`, only a strictly greater
    /// probability replaces the current maximum.
    pub fn argmax(&self) -> SentimentClass {
        let mut max_index = 0;
        for i in 1..NUM_CLASSES {
            if self.0[i] > self.0[max_index] {
                max_index = i;
            }
        }
        SentimentClass::ALL[max_index]
    }

    /// Element-wise arithmetic mean of one or more distributions.
    ///
    /// This is the document-level aggregation: each class probability is
    /// averaged independently across sentences, which keeps the result a valid
    /// distribution. An empty slice fails with
    /// [`PipelineError::EmptyDocument`].
    pub fn mean(distributions: &[SentimentDistribution]) -> Result<Self> {
        if distributions.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }
        let mut sums = [0.0f64; NUM_CLASSES];
        for dist in distributions {
            for (sum, &p) in sums.iter_mut().zip(dist.0.iter()) {
                *sum += f64::from(p);
            }
        }
        let n = distributions.len() as f64;
        let mut probs = [0.0f32; NUM_CLASSES];
        for (out, sum) in probs.iter_mut().zip(sums.iter()) {
            *out = (sum / n) as f32;
        }
        Self::from_probabilities(probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(probs: [f32; NUM_CLASSES]) -> SentimentDistribution {
        SentimentDistribution::from_probabilities(probs).unwrap()
    }

    #[test]
    fn valid_distribution_accepted() {
        let d = dist([0.05, 0.05, 0.10, 0.30, 0.50]);
        assert!((d.probabilities().iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert_eq!(d.get(SentimentClass::VeryPositive), 0.50);
    }

    #[test]
    fn rejects_bad_sum() {
        let err = SentimentDistribution::from_probabilities([0.5, 0.5, 0.5, 0.0, 0.0]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_negative_entry() {
        let err = SentimentDistribution::from_probabilities([-0.1, 0.3, 0.3, 0.3, 0.2]);
        assert!(err.is_err());
    }

    #[test]
    fn argmax_picks_maximum() {
        let d = dist([0.1, 0.1, 0.6, 0.1, 0.1]);
        assert_eq!(d.argmax(), SentimentClass::Neutral);
    }

    #[test]
    fn argmax_tie_break_lowest_index() {
        let d = dist([0.0, 0.4, 0.1, 0.4, 0.1]);
        assert_eq!(d.argmax(), SentimentClass::Negative);

        let all_equal = dist([0.2, 0.2, 0.2, 0.2, 0.2]);
        assert_eq!(all_equal.argmax(), SentimentClass::VeryNegative);
    }

    #[test]
    fn mean_is_a_true_mean() {
        let a = dist([0.1, 0.1, 0.6, 0.1, 0.1]);
        let b = dist([0.0, 0.0, 0.0, 0.0, 1.0]);
        let overall = SentimentDistribution::mean(&[a, b]).unwrap();
        let expected = [0.05, 0.05, 0.30, 0.05, 0.55];
        for (got, want) in overall.probabilities().iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
        assert_eq!(overall.argmax(), SentimentClass::VeryPositive);
    }

    #[test]
    fn mean_of_single_distribution_is_identity() {
        let d = dist([0.05, 0.05, 0.10, 0.30, 0.50]);
        let overall = SentimentDistribution::mean(std::slice::from_ref(&d)).unwrap();
        assert_eq!(overall, d);
        assert_eq!(overall.argmax(), SentimentClass::VeryPositive);
    }

    #[test]
    fn mean_of_empty_slice_is_rejected() {
        let err = SentimentDistribution::mean(&[]);
        assert!(matches!(err, Err(PipelineError::EmptyDocument)));
    }

    #[test]
    fn labels_match_external_strings() {
        let labels: Vec<&str> = SentimentClass::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            ["Very Negative", "Negative", "Neutral", "Positive", "Very Positive"]
        );
    }
}
