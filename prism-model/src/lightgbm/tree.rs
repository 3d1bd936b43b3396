//! Single LightGBM tree and its split rules.
//!
//! Node references follow LightGBM: a non-negative child is an internal node
//! index, a negative child `c` is leaf `!c`.

/// Values with magnitude at or below this are "zero" for missing handling.
const ZERO_THRESHOLD: f64 = 1e-35;

/// Missing value handling strategy, bits 2-3 of `decision_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingType {
    None,
    Zero,
    NaN,
}

/// Parsed decision type from LightGBM's bitfield.
///
/// - Bit 0: categorical flag
/// - Bit 1: default_left flag
/// - Bits 2-3: missing type (0=None, 1=Zero, 2=NaN)
#[derive(Debug, Clone, Copy)]
pub struct DecisionType {
    pub is_categorical: bool,
    pub default_left: bool,
    pub missing_type: MissingType,
}

impl DecisionType {
    pub fn from_i8(value: i8) -> Self {
        let v = value as u8;
        DecisionType {
            is_categorical: (v & 1) != 0,
            default_left: (v & 2) != 0,
            missing_type: match (v >> 2) & 3 {
                1 => MissingType::Zero,
                2 => MissingType::NaN,
                _ => MissingType::None,
            },
        }
    }
}

/// Reference to a node inside one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Internal(usize),
    Leaf(usize),
}

impl NodeRef {
    fn from_child(child: i32) -> Self {
        if child >= 0 {
            NodeRef::Internal(child as usize)
        } else {
            NodeRef::Leaf(!child as usize)
        }
    }
}

/// A parsed LightGBM tree.
#[derive(Debug, Clone, Default)]
pub struct LgbTree {
    pub num_leaves: usize,
    /// Feature index for each internal node
    pub split_feature: Vec<usize>,
    /// Numeric threshold, or category slot index for categorical nodes
    pub threshold: Vec<f64>,
    pub decision_type: Vec<i8>,
    pub left_child: Vec<i32>,
    pub right_child: Vec<i32>,
    /// Output for each leaf, shrinkage already applied
    pub leaf_value: Vec<f64>,
    /// Training rows reaching each leaf
    pub leaf_count: Vec<f64>,
    /// Training rows reaching each internal node
    pub internal_count: Vec<f64>,
    /// Category bitset offsets into `cat_threshold` (num_cat + 1 entries)
    pub cat_boundaries: Vec<usize>,
    pub cat_threshold: Vec<u32>,
    pub is_linear: bool,
}

impl LgbTree {
    /// Structural checks done once at load time so evaluation can index freely.
    pub fn validate(&self, num_features: usize) -> Result<(), String> {
        let num_splits = self.num_leaves.saturating_sub(1);

        for node in 0..num_splits {
            for child in [self.left_child[node], self.right_child[node]] {
                match NodeRef::from_child(child) {
                    NodeRef::Internal(i) if i >= num_splits || i <= node => {
                        return Err(format!("node {} has invalid internal child {}", node, i));
                    }
                    NodeRef::Leaf(i) if i >= self.num_leaves => {
                        return Err(format!("node {} has invalid leaf child {}", node, i));
                    }
                    _ => {}
                }
            }

            if self.split_feature[node] >= num_features {
                return Err(format!(
                    "node {} splits on feature {} but model has {} features",
                    node, self.split_feature[node], num_features
                ));
            }

            if self.decision(node).is_categorical && self.category_set(node).is_none() {
                return Err(format!(
                    "node {} references missing category set {}",
                    node, self.threshold[node]
                ));
            }
        }

        Ok(())
    }

    pub fn root(&self) -> NodeRef {
        if self.num_leaves <= 1 {
            NodeRef::Leaf(0)
        } else {
            NodeRef::Internal(0)
        }
    }

    pub fn decision(&self, node: usize) -> DecisionType {
        DecisionType::from_i8(self.decision_type[node])
    }

    pub fn left(&self, node: usize) -> NodeRef {
        NodeRef::from_child(self.left_child[node])
    }

    pub fn right(&self, node: usize) -> NodeRef {
        NodeRef::from_child(self.right_child[node])
    }

    /// Training rows that reached `node`
    pub fn cover(&self, node: NodeRef) -> f64 {
        match node {
            NodeRef::Internal(i) => self.internal_count[i],
            NodeRef::Leaf(i) => self.leaf_count[i],
        }
    }

    /// Whether `row` goes to the left child at internal node `node`
    pub fn goes_left(&self, node: usize, row: &[f64]) -> bool {
        let fvalue = row[self.split_feature[node]];
        let decision = self.decision(node);

        if decision.is_categorical {
            return self.categorical_left(node, fvalue);
        }

        let fvalue = if fvalue.is_nan() && decision.missing_type != MissingType::NaN {
            0.0
        } else {
            fvalue
        };

        let missing = match decision.missing_type {
            MissingType::Zero => fvalue.abs() <= ZERO_THRESHOLD,
            MissingType::NaN => fvalue.is_nan(),
            MissingType::None => false,
        };

        if missing {
            decision.default_left
        } else {
            fvalue <= self.threshold[node]
        }
    }

    /// Category bitset for a categorical node, `None` if the slot or its
    /// bounds are not in the model.
    fn category_set(&self, node: usize) -> Option<&[u32]> {
        let threshold = self.threshold[node];
        if !(threshold >= 0.0 && threshold.fract() == 0.0) {
            return None;
        }
        let slot = threshold as usize;
        let start = *self.cat_boundaries.get(slot)?;
        let end = *self.cat_boundaries.get(slot.checked_add(1)?)?;
        self.cat_threshold.get(start..end)
    }

    /// Values truncate toward zero; negative categories and NaN go right.
    fn categorical_left(&self, node: usize, fvalue: f64) -> bool {
        let category = fvalue.trunc();
        if fvalue.is_nan() || category < 0.0 {
            return false;
        }
        let category = category as usize;

        self.category_set(node)
            .and_then(|bitset| bitset.get(category / 32))
            .map(|word| (word >> (category % 32)) & 1 == 1)
            .unwrap_or(false)
    }

    /// Child of `node` that `row` follows
    pub fn next(&self, node: usize, row: &[f64]) -> NodeRef {
        if self.goes_left(node, row) {
            self.left(node)
        } else {
            self.right(node)
        }
    }

    /// Leaf output for `row`
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self.root();
        loop {
            match node {
                NodeRef::Leaf(leaf) => return self.leaf_value[leaf],
                NodeRef::Internal(i) => node = self.next(i, row),
            }
        }
    }

    /// Share of training rows going (left, right) at internal node `node`
    pub fn child_fractions(&self, node: usize) -> (f64, f64) {
        let left = self.cover(self.left(node));
        let right = self.cover(self.right(node));
        let total = left + right;
        if total > 0.0 {
            (left / total, right / total)
        } else {
            (0.5, 0.5)
        }
    }

    /// Cover-weighted mean leaf output: the tree's contribution to the
    /// expected raw score over the training distribution.
    pub fn expected_value(&self) -> f64 {
        self.expectation(self.root())
    }

    fn expectation(&self, node: NodeRef) -> f64 {
        match node {
            NodeRef::Leaf(leaf) => self.leaf_value[leaf],
            NodeRef::Internal(i) => {
                let (left, right) = self.child_fractions(i);
                left * self.expectation(self.left(i)) + right * self.expectation(self.right(i))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x0 <= 0.5 -> leaf 0 (-1), else leaf 1 (+1)
    fn stump(decision_type: i8) -> LgbTree {
        LgbTree {
            num_leaves: 2,
            split_feature: vec![0],
            threshold: vec![0.5],
            decision_type: vec![decision_type],
            left_child: vec![-1],
            right_child: vec![-2],
            leaf_value: vec![-1.0, 1.0],
            leaf_count: vec![30.0, 70.0],
            internal_count: vec![100.0],
            ..LgbTree::default()
        }
    }

    #[test]
    fn test_decision_type_bits() {
        let dt = DecisionType::from_i8(0);
        assert!(!dt.is_categorical);
        assert!(!dt.default_left);
        assert_eq!(dt.missing_type, MissingType::None);

        let dt = DecisionType::from_i8(2);
        assert!(dt.default_left);

        let dt = DecisionType::from_i8(1);
        assert!(dt.is_categorical);

        assert_eq!(DecisionType::from_i8(4).missing_type, MissingType::Zero);
        assert_eq!(DecisionType::from_i8(8).missing_type, MissingType::NaN);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let tree = stump(0);
        assert_eq!(tree.predict(&[0.5]), -1.0);
        assert_eq!(tree.predict(&[0.50001]), 1.0);
    }

    #[test]
    fn test_nan_with_missing_none_is_zero() {
        let tree = stump(0);
        assert_eq!(tree.predict(&[f64::NAN]), -1.0);
    }

    #[test]
    fn test_nan_missing_follows_default_direction() {
        // missing=NaN, default right
        let tree = stump(8);
        assert_eq!(tree.predict(&[f64::NAN]), 1.0);
        // missing=NaN, default left
        let tree = stump(8 | 2);
        assert_eq!(tree.predict(&[f64::NAN]), -1.0);
    }

    #[test]
    fn test_zero_missing_follows_default_direction() {
        let mut tree = stump(4);
        tree.threshold = vec![-0.5];
        // zero is missing, default right
        assert_eq!(tree.predict(&[0.0]), 1.0);
        assert_eq!(tree.predict(&[-1.0]), -1.0);
    }

    #[test]
    fn test_categorical_bitset() {
        let tree = LgbTree {
            num_leaves: 2,
            split_feature: vec![0],
            threshold: vec![0.0],
            decision_type: vec![1],
            left_child: vec![-1],
            right_child: vec![-2],
            leaf_value: vec![-1.0, 1.0],
            leaf_count: vec![50.0, 50.0],
            internal_count: vec![100.0],
            // categories 1 and 4 go left
            cat_boundaries: vec![0, 1],
            cat_threshold: vec![0b10010],
            ..LgbTree::default()
        };
        assert!(tree.validate(1).is_ok());
        assert_eq!(tree.predict(&[1.0]), -1.0);
        assert_eq!(tree.predict(&[4.0]), -1.0);
        assert_eq!(tree.predict(&[2.0]), 1.0);
        assert_eq!(tree.predict(&[40.0]), 1.0);
        assert_eq!(tree.predict(&[-1.0]), 1.0);
        assert_eq!(tree.predict(&[f64::NAN]), 1.0);
    }

    fn categorical_stump(threshold: f64, cat_boundaries: Vec<usize>) -> LgbTree {
        LgbTree {
            num_leaves: 2,
            split_feature: vec![0],
            threshold: vec![threshold],
            decision_type: vec![1],
            left_child: vec![-1],
            right_child: vec![-2],
            leaf_value: vec![-1.0, 1.0],
            leaf_count: vec![50.0, 50.0],
            internal_count: vec![100.0],
            cat_boundaries,
            cat_threshold: vec![7],
            ..LgbTree::default()
        }
    }

    #[test]
    fn test_validate_rejects_bad_category_sets() {
        // Boundaries running backwards
        assert!(categorical_stump(0.0, vec![1, 0]).validate(1).is_err());
        // Slot past the boundary table
        assert!(categorical_stump(1.0, vec![0, 1]).validate(1).is_err());
        // End past the bitset words
        assert!(categorical_stump(0.0, vec![0, 2]).validate(1).is_err());
        // Saturating cast of a huge slot
        assert!(categorical_stump(1e300, vec![0, 1]).validate(1).is_err());
        assert!(categorical_stump(-1.0, vec![0, 1]).validate(1).is_err());
        assert!(categorical_stump(f64::NAN, vec![0, 1]).validate(1).is_err());

        assert!(categorical_stump(0.0, vec![0, 1]).validate(1).is_ok());
    }

    #[test]
    fn test_unvalidated_bad_category_set_goes_right() {
        let tree = categorical_stump(0.0, vec![1, 0]);
        assert_eq!(tree.predict(&[0.0]), 1.0);
    }

    #[test]
    fn test_fractional_negative_category_truncates_to_zero() {
        // bitset 0b111: categories 0, 1, 2 go left
        let tree = categorical_stump(0.0, vec![0, 1]);
        assert_eq!(tree.predict(&[-0.5]), -1.0);
        assert_eq!(tree.predict(&[2.9]), -1.0);
        assert_eq!(tree.predict(&[-1.0]), 1.0);
        assert_eq!(tree.predict(&[3.0]), 1.0);
    }

    #[test]
    fn test_expected_value_is_cover_weighted() {
        let tree = stump(0);
        assert!((tree.expected_value() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let tree = stump(0);
        assert!(tree.validate(1).is_ok());
        let mut bad = stump(0);
        bad.split_feature = vec![3];
        assert!(bad.validate(1).is_err());
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = LgbTree {
            num_leaves: 1,
            leaf_value: vec![0.3],
            leaf_count: vec![10.0],
            ..LgbTree::default()
        };
        assert!(tree.validate(2).is_ok());
        assert_eq!(tree.root(), NodeRef::Leaf(0));
        assert_eq!(tree.predict(&[1.0, 2.0]), 0.3);
        assert!((tree.expected_value() - 0.3).abs() < 1e-12);
    }
}
