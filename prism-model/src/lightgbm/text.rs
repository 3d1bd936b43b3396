//! LightGBM text model format parser.
//!
//! Reads the line-based `key=value` format written by `Booster.save_model()`.
//! Only the header and the `Tree=` blocks are consumed; everything after
//! `end of trees` (importances, parameters, pandas metadata) is ignored.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Lines;

use super::tree::LgbTree;

/// Error type for LightGBM model parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error("array size mismatch for {field}: expected {expected}, got {actual}")]
    ArraySizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid tree format: {0}")]
    InvalidTreeFormat(String),
}

/// Parsed objective function information.
#[derive(Debug, Clone, PartialEq)]
pub enum LgbObjective {
    /// Binary classification with logloss
    Binary { sigmoid: f64 },
    /// Anything else, raw string preserved for error reporting
    Other(String),
}

impl LgbObjective {
    /// Parse from LightGBM objective string, e.g. `"binary sigmoid:1"`.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        match parts.next() {
            Some("binary") => {
                let sigmoid = parts
                    .find_map(|p| p.strip_prefix("sigmoid:").and_then(|v| v.parse().ok()))
                    .unwrap_or(1.0);
                LgbObjective::Binary { sigmoid }
            }
            _ => LgbObjective::Other(s.to_string()),
        }
    }
}

/// Parsed LightGBM model header.
#[derive(Debug, Clone, Default)]
pub struct LgbHeader {
    /// Model format version (e.g., "v4")
    pub version: String,
    pub num_class: usize,
    pub num_tree_per_iteration: usize,
    /// Maximum feature index used (0-based)
    pub max_feature_idx: usize,
    pub objective: Option<LgbObjective>,
    /// Random-forest mode: output is the mean of the trees
    pub average_output: bool,
    pub feature_names: Vec<String>,
}

/// A parsed LightGBM model.
#[derive(Debug, Clone)]
pub struct LgbModel {
    pub header: LgbHeader,
    pub trees: Vec<LgbTree>,
}

impl LgbModel {
    /// Parse a model from its text representation.
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut lines = content.lines().peekable();

        let header = parse_header(&mut lines)?;

        let mut trees = Vec::new();
        while let Some(line) = lines.next() {
            if line.starts_with("Tree=") {
                let tree = parse_tree(&mut lines)?;
                tree.validate(header.max_feature_idx + 1)
                    .map_err(|reason| {
                        ParseError::InvalidTreeFormat(format!("{}: {}", line, reason))
                    })?;
                trees.push(tree);
            } else if line == "end of trees" {
                break;
            }
        }

        if trees.is_empty() {
            return Err(ParseError::InvalidTreeFormat("model contains no trees".to_string()));
        }

        Ok(LgbModel { header, trees })
    }

    /// Number of features.
    pub fn num_features(&self) -> usize {
        self.header.max_feature_idx + 1
    }
}

/// Collect `key=value` lines until `stop` matches the next line.
fn collect_pairs(
    lines: &mut Peekable<Lines<'_>>,
    stop: impl Fn(&str) -> bool,
) -> (HashMap<String, String>, Vec<String>) {
    let mut kv = HashMap::new();
    let mut flags = Vec::new();

    while let Some(line) = lines.next_if(|line| !stop(line)) {
        match line.split_once('=') {
            Some((key, value)) => {
                kv.insert(key.to_string(), value.to_string());
            }
            None => flags.push(line.to_string()),
        }
    }

    (kv, flags)
}

/// Parse header section until first blank line or `Tree=` line.
fn parse_header(lines: &mut Peekable<Lines<'_>>) -> Result<LgbHeader, ParseError> {
    // Leading model type line ("tree")
    lines.next_if(|line| !line.contains('='));

    let (kv, flags) = collect_pairs(lines, |line| line.is_empty() || line.starts_with("Tree="));

    let num_class = required(&kv, "num_class")?;
    let objective = kv.get("objective").map(|obj| LgbObjective::parse(obj));

    Ok(LgbHeader {
        version: kv.get("version").cloned().unwrap_or_default(),
        num_class,
        num_tree_per_iteration: optional(&kv, "num_tree_per_iteration")?
            .unwrap_or(num_class.max(1)),
        max_feature_idx: required(&kv, "max_feature_idx")?,
        objective,
        average_output: flags.iter().any(|flag| flag == "average_output"),
        feature_names: kv
            .get("feature_names")
            .map(|names| names.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
    })
}

/// Parse a single tree section (the `Tree=N` line is already consumed).
fn parse_tree(lines: &mut Peekable<Lines<'_>>) -> Result<LgbTree, ParseError> {
    let (kv, _) = collect_pairs(lines, |line| {
        line.is_empty() || line.starts_with("Tree=") || line == "end of trees"
    });

    let num_leaves: usize = required(&kv, "num_leaves")?;
    if num_leaves == 0 {
        return Err(ParseError::InvalidValue {
            field: "num_leaves",
            message: "tree must have at least one leaf".to_string(),
        });
    }

    let is_linear = optional::<i32>(&kv, "is_linear")?.unwrap_or(0) != 0;

    // Single-leaf tree has no splits
    if num_leaves == 1 {
        let leaf_value = array(&kv, "leaf_value")?.unwrap_or_else(|| vec![0.0]);
        validate_array_size("leaf_value", &leaf_value, 1)?;
        return Ok(LgbTree {
            num_leaves,
            leaf_value,
            leaf_count: array(&kv, "leaf_count")?.unwrap_or_else(|| vec![1.0]),
            is_linear,
            ..LgbTree::default()
        });
    }

    let num_splits = num_leaves - 1;

    let split_feature: Vec<usize> = required_array(&kv, "split_feature")?;
    validate_array_size("split_feature", &split_feature, num_splits)?;

    let threshold: Vec<f64> = required_array(&kv, "threshold")?;
    validate_array_size("threshold", &threshold, num_splits)?;

    let decision_type: Vec<i8> = array(&kv, "decision_type")?.unwrap_or_else(|| vec![0; num_splits]);
    validate_array_size("decision_type", &decision_type, num_splits)?;

    let left_child: Vec<i32> = required_array(&kv, "left_child")?;
    validate_array_size("left_child", &left_child, num_splits)?;

    let right_child: Vec<i32> = required_array(&kv, "right_child")?;
    validate_array_size("right_child", &right_child, num_splits)?;

    let leaf_value: Vec<f64> = required_array(&kv, "leaf_value")?;
    validate_array_size("leaf_value", &leaf_value, num_leaves)?;

    let leaf_count: Vec<f64> = required_array(&kv, "leaf_count")?;
    validate_array_size("leaf_count", &leaf_count, num_leaves)?;

    let internal_count: Vec<f64> = required_array(&kv, "internal_count")?;
    validate_array_size("internal_count", &internal_count, num_splits)?;

    let num_cat: usize = optional(&kv, "num_cat")?.unwrap_or(0);
    let (cat_boundaries, cat_threshold) = if num_cat > 0 {
        let boundaries: Vec<usize> = required_array(&kv, "cat_boundaries")?;
        validate_array_size("cat_boundaries", &boundaries, num_cat + 1)?;
        (boundaries, required_array(&kv, "cat_threshold")?)
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(LgbTree {
        num_leaves,
        split_feature,
        threshold,
        decision_type,
        left_child,
        right_child,
        leaf_value,
        leaf_count,
        internal_count,
        cat_boundaries,
        cat_threshold,
        is_linear,
    })
}

fn required<T: std::str::FromStr>(
    kv: &HashMap<String, String>,
    field: &'static str,
) -> Result<T, ParseError> {
    optional(kv, field)?.ok_or(ParseError::MissingField(field))
}

fn optional<T: std::str::FromStr>(
    kv: &HashMap<String, String>,
    field: &'static str,
) -> Result<Option<T>, ParseError> {
    kv.get(field)
        .map(|v| {
            v.trim().parse().map_err(|_| ParseError::InvalidValue {
                field,
                message: format!("cannot parse {:?}", v),
            })
        })
        .transpose()
}

fn required_array<T: std::str::FromStr>(
    kv: &HashMap<String, String>,
    field: &'static str,
) -> Result<Vec<T>, ParseError> {
    array(kv, field)?.ok_or(ParseError::MissingField(field))
}

fn array<T: std::str::FromStr>(
    kv: &HashMap<String, String>,
    field: &'static str,
) -> Result<Option<Vec<T>>, ParseError> {
    kv.get(field)
        .map(|s| {
            s.split_whitespace()
                .map(|v| {
                    v.parse().map_err(|_| ParseError::InvalidValue {
                        field,
                        message: format!("invalid element: {}", v),
                    })
                })
                .collect()
        })
        .transpose()
}

fn validate_array_size<T>(field: &'static str, arr: &[T], expected: usize) -> Result<(), ParseError> {
    if arr.len() != expected {
        return Err(ParseError::ArraySizeMismatch {
            field,
            expected,
            actual: arr.len(),
        });
    }
    Ok(())
}
