//! SHAP attribution for the loaded tree ensemble.

mod path;
mod tree_explainer;
mod values;

pub use tree_explainer::TreeExplainer;
pub use values::{Attribution, Contribution};
