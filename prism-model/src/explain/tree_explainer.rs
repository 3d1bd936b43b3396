//! TreeSHAP explainer for the loaded ensemble.
//!
//! Implements path-dependent TreeSHAP from Lundberg et al. (2020):
//! "From local explanations to global understanding with explainable AI for trees".
//! Node covers come from the model's `leaf_count`/`internal_count`, and
//! values are in raw (log-odds) space.

use super::path::PathState;
use super::{Attribution, Contribution};
use crate::lightgbm::{LgbTree, NodeRef};
use crate::{ModelArtifact, Result, Subject};

/// Exact SHAP values for one record at a time.
#[derive(Debug, Clone, Copy)]
pub struct TreeExplainer<'a> {
    model: &'a ModelArtifact,
    base_value: f64,
}

impl<'a> TreeExplainer<'a> {
    pub fn new(model: &'a ModelArtifact) -> Self {
        let base_value = model.trees().iter().map(LgbTree::expected_value).sum::<f64>()
            * model.output_scale();

        Self { model, base_value }
    }

    /// Expected raw score (the force plot's "base value")
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Attribution for one subject. Recomputed on every call.
    pub fn explain(&self, subject: &Subject) -> Result<Attribution> {
        let row = subject.feature_row(self.model.feature_names())?;
        let shap = self.shap_values(&row)?;

        let contributions = self
            .model
            .feature_names()
            .iter()
            .zip(row.iter().zip(&shap))
            .map(|(feature, (&value, &shap))| Contribution {
                feature: feature.clone(),
                value,
                shap,
            })
            .collect();

        Ok(Attribution {
            base_value: self.base_value,
            output_value: self.model.raw_score(&row)?,
            contributions,
        })
    }

    /// SHAP value per feature for a row in model column order.
    pub fn shap_values(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.model.check_row(row)?;

        let mut phi = vec![0.0; row.len()];
        for tree in self.model.trees() {
            let depth = tree_depth(tree, tree.root());
            tree_shap(tree, row, tree.root(), PathState::root(depth), &mut phi, 1.0, 1.0, None);
        }

        let scale = self.model.output_scale();
        for value in &mut phi {
            *value *= scale;
        }

        Ok(phi)
    }
}

/// Recursive TreeSHAP over one tree.
///
/// `zero_fraction`/`one_fraction`/`feature` describe the edge that led into
/// `node`; the root call passes the sentinel `(1, 1, None)`.
#[allow(clippy::too_many_arguments)]
fn tree_shap(
    tree: &LgbTree,
    row: &[f64],
    node: NodeRef,
    mut path: PathState,
    phi: &mut [f64],
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    path.extend(feature, zero_fraction, one_fraction);

    let split = match node {
        NodeRef::Leaf(leaf) => {
            let leaf_value = tree.leaf_value[leaf];
            for i in 1..=path.depth() {
                let element = path.element(i);
                if let Some(f) = element.feature {
                    let weight = path.unwound_sum(i);
                    phi[f] += weight * (element.one_fraction - element.zero_fraction) * leaf_value;
                }
            }
            return;
        }
        NodeRef::Internal(split) => split,
    };

    let split_feature = tree.split_feature[split];
    let (left_fraction, right_fraction) = tree.child_fractions(split);
    let (hot, cold, hot_fraction, cold_fraction) = if tree.goes_left(split, row) {
        (tree.left(split), tree.right(split), left_fraction, right_fraction)
    } else {
        (tree.right(split), tree.left(split), right_fraction, left_fraction)
    };

    // A feature split on twice only appears once on the path
    let mut incoming_zero = 1.0;
    let mut incoming_one = 1.0;
    if let Some(index) = path.position(split_feature) {
        let element = path.element(index);
        incoming_zero = element.zero_fraction;
        incoming_one = element.one_fraction;
        path.unwind(index);
    }

    tree_shap(
        tree,
        row,
        hot,
        path.clone(),
        phi,
        hot_fraction * incoming_zero,
        incoming_one,
        Some(split_feature),
    );
    tree_shap(
        tree,
        row,
        cold,
        path,
        phi,
        cold_fraction * incoming_zero,
        0.0,
        Some(split_feature),
    );
}

fn tree_depth(tree: &LgbTree, node: NodeRef) -> usize {
    match node {
        NodeRef::Leaf(_) => 0,
        NodeRef::Internal(i) => {
            1 + tree_depth(tree, tree.left(i)).max(tree_depth(tree, tree.right(i)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Race;

    const FIXTURE: &str = include_str!("../../tests/fixtures/lgbm.txt");

    fn model() -> ModelArtifact {
        ModelArtifact::from_text(FIXTURE).unwrap()
    }

    /// E[f(x) | x_S] under the path-dependent cover distribution
    fn conditional_expectation(tree: &LgbTree, node: NodeRef, row: &[f64], known: &[bool]) -> f64 {
        match node {
            NodeRef::Leaf(leaf) => tree.leaf_value[leaf],
            NodeRef::Internal(i) => {
                if known[tree.split_feature[i]] {
                    conditional_expectation(tree, tree.next(i, row), row, known)
                } else {
                    let (l, r) = tree.child_fractions(i);
                    l * conditional_expectation(tree, tree.left(i), row, known)
                        + r * conditional_expectation(tree, tree.right(i), row, known)
                }
            }
        }
    }

    /// Shapley values by enumerating every coalition
    fn brute_force_shap(model: &ModelArtifact, row: &[f64]) -> Vec<f64> {
        let n = row.len();
        let factorial = |k: usize| (1..=k).product::<usize>() as f64;
        let value = |mask: usize| -> f64 {
            let known: Vec<bool> = (0..n).map(|f| mask & (1 << f) != 0).collect();
            model
                .trees()
                .iter()
                .map(|tree| conditional_expectation(tree, tree.root(), row, &known))
                .sum()
        };

        (0..n)
            .map(|feature| {
                let mut phi = 0.0;
                for mask in 0..(1usize << n) {
                    if mask & (1 << feature) != 0 {
                        continue;
                    }
                    let size = mask.count_ones() as usize;
                    let weight = factorial(size) * factorial(n - size - 1) / factorial(n);
                    phi += weight * (value(mask | (1 << feature)) - value(mask));
                }
                phi
            })
            .collect()
    }

    #[test]
    fn test_base_value_is_expected_raw_score() {
        let model = model();
        let explainer = TreeExplainer::new(&model);
        // -0.155 - 0.005 + 0.019
        assert!((explainer.base_value() - (-0.141)).abs() < 1e-12);
    }

    #[test]
    fn test_one_entry_per_feature() {
        let model = model();
        let attribution = TreeExplainer::new(&model).explain(&Subject::default()).unwrap();

        assert_eq!(attribution.contributions.len(), 4);
        let names: Vec<&str> = attribution.contributions.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(names, vec!["RACE", "BMI", "AGE", "C4_0"]);
        assert_eq!(attribution.contributions[2].value, 48.0);
    }

    #[test]
    fn test_sums_to_raw_prediction() {
        let model = model();
        let explainer = TreeExplainer::new(&model);

        for race in Race::ALL {
            for (bmi, age, c4) in [(24.51, 48.0, 2.411), (35.0, 70.0, 6.0), (18.0, 25.0, 0.0)] {
                let subject = Subject {
                    race,
                    bmi,
                    age,
                    fatty_acid_intake: c4,
                };
                let attribution = explainer.explain(&subject).unwrap();
                assert!(attribution.verify(1e-9), "additivity failed for {:?}", subject);
            }
        }
    }

    #[test]
    fn test_default_subject_known_values() {
        let model = model();
        let attribution = TreeExplainer::new(&model).explain(&Subject::default()).unwrap();
        let shap: Vec<f64> = attribution.contributions.iter().map(|c| c.shap).collect();

        assert!((attribution.output_value - (-0.60)).abs() < 1e-12);
        // RACE = 4 sits on the high side of the intake subtree
        assert!(shap[0] > 0.0);
        assert!((shap[0] - 0.015).abs() < 1e-12);
        assert!(shap[1] < 0.0);
        assert!(shap[2] < 0.0);
        assert!(shap[3] < 0.0);
    }

    #[test]
    fn test_matches_brute_force_shapley() {
        let model = model();
        let explainer = TreeExplainer::new(&model);

        for row in [
            [4.0, 24.51, 48.0, 2.411],
            [3.0, 31.0, 38.0, 4.2],
            [5.0, 29.0, 66.0, 3.5],
            [1.0, 40.0, 79.0, 0.0],
        ] {
            let fast = explainer.shap_values(&row).unwrap();
            let exact = brute_force_shap(&model, &row);
            for (f, (a, b)) in fast.iter().zip(&exact).enumerate() {
                assert!((a - b).abs() < 1e-9, "feature {} row {:?}: {} vs {}", f, row, a, b);
            }
        }
    }

    #[test]
    fn test_repeated_feature_on_path() {
        // Tree 2 splits on AGE twice along one path; AGE takes all of its credit
        let model = model();
        let explainer = TreeExplainer::new(&model);
        let row = [4.0, 24.51, 70.0, 2.411];
        let fast = explainer.shap_values(&row).unwrap();
        let exact = brute_force_shap(&model, &row);
        assert!((fast[2] - exact[2]).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_width_row_rejected() {
        let model = model();
        assert!(TreeExplainer::new(&model).shap_values(&[1.0]).is_err());
    }
}
