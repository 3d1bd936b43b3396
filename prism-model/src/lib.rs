//! # PRISm model library
//!
//! Everything the calculator needs between the form and the page:
//! - `Subject` record and the `Race` code set
//! - LightGBM text model parsing and evaluation
//! - Model artifact loading with version/objective checks
//! - Positive-class prediction
//! - TreeSHAP attribution and the force plot SVG

pub mod artifact;
pub mod error;
pub mod explain;
pub mod lightgbm;
pub mod plot;
pub mod predict;
pub mod subject;

pub use artifact::ModelArtifact;
pub use error::{ModelError, Result};
pub use explain::{Attribution, Contribution, TreeExplainer};
pub use predict::{Prediction, Predictor};
pub use subject::{Race, Subject, FEATURE_NAMES};
