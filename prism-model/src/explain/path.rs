//! Unique feature path bookkeeping for TreeSHAP.
//!
//! Each element carries the fraction of "zero" (feature unknown) and "one"
//! (feature known) paths flowing through it, plus the permutation weight
//! accumulated for subsets of the features above it.

#[derive(Debug, Clone, Copy)]
pub(crate) struct PathElement {
    /// `None` only for the root sentinel
    pub feature: Option<usize>,
    pub zero_fraction: f64,
    pub one_fraction: f64,
    weight: f64,
}

/// Path from the root to the current node, one element per unique feature.
#[derive(Debug, Clone)]
pub(crate) struct PathState {
    elements: Vec<PathElement>,
}

impl PathState {
    /// Path holding only the root sentinel
    pub fn root(capacity: usize) -> Self {
        let mut path = Self {
            elements: Vec::with_capacity(capacity + 1),
        };
        path.extend(None, 1.0, 1.0);
        path
    }

    /// Number of unique features on the path (sentinel excluded)
    pub fn depth(&self) -> usize {
        self.elements.len() - 1
    }

    pub fn element(&self, index: usize) -> &PathElement {
        &self.elements[index]
    }

    /// Position of `feature` on the path, if already split on above
    pub fn position(&self, feature: usize) -> Option<usize> {
        (1..self.elements.len()).find(|&i| self.elements[i].feature == Some(feature))
    }

    pub fn extend(&mut self, feature: Option<usize>, zero_fraction: f64, one_fraction: f64) {
        let depth = self.elements.len();
        self.elements.push(PathElement {
            feature,
            zero_fraction,
            one_fraction,
            weight: if depth == 0 { 1.0 } else { 0.0 },
        });

        let scale = (depth + 1) as f64;
        for i in (0..depth).rev() {
            let w = self.elements[i].weight;
            self.elements[i + 1].weight += one_fraction * w * (i + 1) as f64 / scale;
            self.elements[i].weight = zero_fraction * w * (depth - i) as f64 / scale;
        }
    }

    /// Undo the `extend` that added the element at `index`.
    pub fn unwind(&mut self, index: usize) {
        let depth = self.depth();
        let PathElement {
            zero_fraction,
            one_fraction,
            ..
        } = self.elements[index];
        let scale = (depth + 1) as f64;

        let mut next_one_portion = self.elements[depth].weight;
        for i in (0..depth).rev() {
            if one_fraction != 0.0 {
                let w = self.elements[i].weight;
                self.elements[i].weight = next_one_portion * scale / ((i + 1) as f64 * one_fraction);
                next_one_portion =
                    w - self.elements[i].weight * zero_fraction * (depth - i) as f64 / scale;
            } else {
                self.elements[i].weight =
                    self.elements[i].weight * scale / (zero_fraction * (depth - i) as f64);
            }
        }

        for i in index..depth {
            let next = self.elements[i + 1];
            let element = &mut self.elements[i];
            element.feature = next.feature;
            element.zero_fraction = next.zero_fraction;
            element.one_fraction = next.one_fraction;
        }
        self.elements.pop();
    }

    /// Total permutation weight the path would carry with `index` removed.
    pub fn unwound_sum(&self, index: usize) -> f64 {
        let depth = self.depth();
        let PathElement {
            zero_fraction,
            one_fraction,
            ..
        } = self.elements[index];
        let scale = (depth + 1) as f64;

        let mut total = 0.0;
        let mut next_one_portion = self.elements[depth].weight;
        for i in (0..depth).rev() {
            if one_fraction != 0.0 {
                let tmp = next_one_portion * scale / ((i + 1) as f64 * one_fraction);
                total += tmp;
                next_one_portion = self.elements[i].weight
                    - tmp * zero_fraction * (depth - i) as f64 / scale;
            } else if zero_fraction != 0.0 {
                total += self.elements[i].weight / zero_fraction / ((depth - i) as f64 / scale);
            }
        }
        total
    }
}
