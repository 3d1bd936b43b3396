//! Per-feature attribution for one subject.

/// One feature's signed push on the raw score
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    /// Model feature name
    pub feature: String,
    /// Input value the subject supplied
    pub value: f64,
    /// SHAP value in log-odds units
    pub shap: f64,
}

impl Contribution {
    /// Plot label, e.g. `AGE = 48`
    pub fn label(&self) -> String {
        format!("{} = {}", self.feature, self.value)
    }
}

/// Additive explanation: `base_value + Σ shap = output_value`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    /// Expected raw score over the training data
    pub base_value: f64,
    /// Raw score for this subject
    pub output_value: f64,
    /// Exactly one entry per model feature, in model column order
    pub contributions: Vec<Contribution>,
}

impl Attribution {
    pub fn shap_sum(&self) -> f64 {
        self.contributions.iter().map(|c| c.shap).sum()
    }

    /// Check the additivity property within `tolerance`.
    pub fn verify(&self, tolerance: f64) -> bool {
        (self.base_value + self.shap_sum() - self.output_value).abs() <= tolerance
    }

    /// Contributions raising the score, largest first
    pub fn positive(&self) -> Vec<&Contribution> {
        self.sorted(|c| c.shap > 0.0)
    }

    /// Contributions lowering the score, largest magnitude first
    pub fn negative(&self) -> Vec<&Contribution> {
        self.sorted(|c| c.shap < 0.0)
    }

    fn sorted(&self, keep: impl Fn(&Contribution) -> bool) -> Vec<&Contribution> {
        let mut selected: Vec<&Contribution> = self.contributions.iter().filter(|c| keep(c)).collect();
        selected.sort_by(|a, b| b.shap.abs().total_cmp(&a.shap.abs()));
        selected
    }
}
