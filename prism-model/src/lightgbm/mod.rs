//! LightGBM compatibility: text model parsing and tree evaluation

mod text;
mod tree;

pub use text::{LgbHeader, LgbModel, LgbObjective, ParseError};
pub use tree::{DecisionType, LgbTree, MissingType, NodeRef};
