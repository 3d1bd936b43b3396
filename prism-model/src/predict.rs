//! Positive-class prediction for one subject

use crate::{ModelArtifact, Result, Subject};

/// Outcome of one prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Summed tree output (log-odds)
    pub raw_score: f64,
    /// Positive-class probability in [0, 1]
    pub probability: f64,
}

impl Prediction {
    /// Probability as a percentage rounded to 2 decimal places, halves to even
    pub fn percentage(&self) -> f64 {
        (self.probability * 100.0 * 100.0).round_ties_even() / 100.0
    }

    /// Fixed-format percentage, e.g. `"35.43 %"`
    pub fn percentage_text(&self) -> String {
        format!("{:.2} %", self.percentage())
    }
}

/// Borrowing wrapper that feeds subjects to a loaded model
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    model: &'a ModelArtifact,
}

impl<'a> Predictor<'a> {
    pub fn new(model: &'a ModelArtifact) -> Self {
        Self { model }
    }

    pub fn predict(&self, subject: &Subject) -> Result<Prediction> {
        let row = subject.feature_row(self.model.feature_names())?;
        let raw_score = self.model.raw_score(&row)?;

        Ok(Prediction {
            raw_score,
            probability: self.model.probability(raw_score),
        })
    }
}
