//! Model artifact loading
//!
//! The classifier is read once at startup and is immutable afterwards; the
//! server shares it between requests behind an `Arc`.

use std::path::Path;

use tracing::info;

use crate::lightgbm::{LgbModel, LgbObjective, LgbTree};
use crate::{ModelError, Result};

/// Text model format versions this loader understands
pub const SUPPORTED_VERSIONS: [&str; 3] = ["v2", "v3", "v4"];

/// Loaded binary classifier
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    version: String,
    sigmoid: f64,
    average_output: bool,
    feature_names: Vec<String>,
    trees: Vec<LgbTree>,
}

impl ModelArtifact {
    /// Read and validate the artifact at `path`.
    ///
    /// Any failure here is fatal for the server: there is no retry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let artifact = Self::from_text(&content)?;

        info!(
            "Loaded model {} (format {}, {} trees, features: {})",
            path.display(),
            artifact.version,
            artifact.trees.len(),
            artifact.feature_names.join(", ")
        );

        Ok(artifact)
    }

    /// Validate a model already held in memory.
    pub fn from_text(content: &str) -> Result<Self> {
        let model = LgbModel::parse(content)?;
        let header = &model.header;

        if !SUPPORTED_VERSIONS.contains(&header.version.as_str()) {
            return Err(ModelError::UnsupportedVersion(header.version.clone()));
        }

        let sigmoid = match &header.objective {
            Some(LgbObjective::Binary { sigmoid }) => *sigmoid,
            Some(LgbObjective::Other(name)) => {
                return Err(ModelError::UnsupportedObjective(name.clone()))
            }
            None => return Err(ModelError::UnsupportedObjective("none".to_string())),
        };

        if header.num_class != 1 || header.num_tree_per_iteration != 1 {
            return Err(ModelError::UnsupportedObjective(format!(
                "binary model with {} classes / {} trees per iteration",
                header.num_class, header.num_tree_per_iteration
            )));
        }

        if let Some(index) = model.trees.iter().position(|tree| tree.is_linear) {
            return Err(ModelError::UnsupportedTree {
                index,
                reason: "linear leaves".to_string(),
            });
        }

        let num_features = model.num_features();
        let feature_names = if header.feature_names.len() == num_features {
            header.feature_names.clone()
        } else {
            (0..num_features).map(|i| format!("Column_{}", i)).collect()
        };

        Ok(Self {
            version: header.version.clone(),
            sigmoid,
            average_output: header.average_output,
            feature_names,
            trees: model.trees,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Slope of the logistic link, `p = 1 / (1 + exp(-sigmoid * raw))`
    pub fn sigmoid(&self) -> f64 {
        self.sigmoid
    }

    /// Feature names in model column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn trees(&self) -> &[LgbTree] {
        &self.trees
    }

    /// Scale applied to summed tree outputs (1/n in random-forest mode)
    pub fn output_scale(&self) -> f64 {
        if self.average_output {
            1.0 / self.trees.len() as f64
        } else {
            1.0
        }
    }

    /// Raw score (log-odds) for a row already in model feature order
    pub fn raw_score(&self, row: &[f64]) -> Result<f64> {
        self.check_row(row)?;
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Ok(sum * self.output_scale())
    }

    /// Logistic link from raw score to positive-class probability
    pub fn probability(&self, raw_score: f64) -> f64 {
        1.0 / (1.0 + (-self.sigmoid * raw_score).exp())
    }

    pub(crate) fn check_row(&self, row: &[f64]) -> Result<()> {
        if row.len() != self.num_features() {
            return Err(ModelError::ShapeMismatch {
                expected: self.num_features(),
                actual: row.len(),
            });
        }
        Ok(())
    }
}
