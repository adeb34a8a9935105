//! CART (Classification and Regression Tree) builder
//!
//! Greedy Gini-impurity decision tree construction over dense `f64`
//! features, with per-node random feature subsampling for use inside a
//! random forest.

use rand::seq::SliceRandom;
use rand::Rng;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    /// Number of candidate features drawn at each node
    pub max_features: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_features: usize::MAX,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Tree node stored in a flat arena; children are arena indices
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Split {
        feature_index: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class probabilities of the training samples that reached the leaf
    Leaf { distribution: Vec<f64> },
}

/// A fitted classification tree
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
    pub n_classes: usize,
}

impl DecisionTree {
    /// Class probability vector for one feature row
    pub fn predict_proba(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature_index] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

/// Best split found for a node
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// Weighted Gini impurity of the two children
    impurity: f64,
}

/// Build a classification tree using the greedy CART algorithm
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    /// `labels` are class indices in `0..n_classes`
    pub fn new(features: &'a [Vec<f64>], labels: &'a [usize], n_classes: usize, config: TreeConfig) -> Self {
        assert_eq!(features.len(), labels.len());

        let feature_count = features.first().map(Vec::len).unwrap_or(0);

        Self {
            config,
            features,
            labels,
            n_classes,
            feature_count,
        }
    }

    /// Build a tree from the given sample indices (repeats allowed, as in a
    /// bootstrap sample)
    pub fn build<R: Rng + ?Sized>(&self, samples: &[usize], rng: &mut R) -> DecisionTree {
        let mut nodes = Vec::new();
        self.build_node(samples, 0, &mut nodes, rng);
        DecisionTree {
            nodes,
            n_classes: self.n_classes,
        }
    }

    /// Recursively build tree nodes, returning the arena index of the node
    fn build_node<R: Rng + ?Sized>(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        rng: &mut R,
    ) -> usize {
        let current_idx = nodes.len();
        let counts = self.class_counts(indices);

        let depth_reached = self.config.max_depth.map_or(false, |max| depth >= max);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if depth_reached || pure || indices.len() < self.config.min_samples_split {
            nodes.push(self.leaf(&counts, indices.len()));
            return current_idx;
        }

        let split = match self.find_best_split(indices, &counts, rng) {
            Some(s) => s,
            None => {
                nodes.push(self.leaf(&counts, indices.len()));
                return current_idx;
            }
        };

        let (left_indices, right_indices) = self.split_samples(indices, split.feature_idx, split.threshold);

        // Reserve the slot; children are patched in once built
        nodes.push(Node::Split {
            feature_index: split.feature_idx,
            threshold: split.threshold,
            left: 0,
            right: 0,
        });

        let left_idx = self.build_node(&left_indices, depth + 1, nodes, rng);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, rng);

        if let Node::Split { left, right, .. } = &mut nodes[current_idx] {
            *left = left_idx;
            *right = right_idx;
        }

        current_idx
    }

    /// Examine a random subset of `max_features` features. If none of them
    /// can split the node, keep drawing from the remaining ones.
    fn find_best_split<R: Rng + ?Sized>(
        &self,
        indices: &[usize],
        parent_counts: &[usize],
        rng: &mut R,
    ) -> Option<SplitCandidate> {
        let mut order: Vec<usize> = (0..self.feature_count).collect();
        order.shuffle(rng);

        let budget = self.config.max_features.clamp(1, self.feature_count.max(1));
        let mut best: Option<SplitCandidate> = None;

        for (visited, &feature_idx) in order.iter().enumerate() {
            if visited >= budget && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_for_feature(indices, parent_counts, feature_idx) {
                if best
                    .as_ref()
                    .map_or(true, |current| candidate.impurity < current.impurity)
                {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Sweep the sorted values of one feature, scoring a threshold between
    /// every pair of distinct neighbours
    fn best_split_for_feature(
        &self,
        indices: &[usize],
        parent_counts: &[usize],
        feature_idx: usize,
    ) -> Option<SplitCandidate> {
        let mut sorted: Vec<(f64, usize)> = indices
            .iter()
            .map(|&i| (self.features[i][feature_idx], self.labels[i]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = sorted.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut left_counts = vec![0usize; self.n_classes];
        let mut right_counts = parent_counts.to_vec();
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..total.saturating_sub(1) {
            let (value, label) = sorted[pos];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let next_value = sorted[pos + 1].0;
            if next_value <= value {
                continue;
            }

            let n_left = pos + 1;
            let n_right = total - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / total as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = value + (next_value - value) / 2.0;
                // Rounding can land the midpoint on the upper value
                if threshold >= next_value {
                    threshold = value;
                }
                best = Some(SplitCandidate {
                    feature_idx,
                    threshold,
                    impurity,
                });
            }
        }

        best
    }

    /// Split samples based on threshold
    fn split_samples(&self, indices: &[usize], feature_idx: usize, threshold: f64) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .partition(|&&idx| self.features[idx][feature_idx] <= threshold)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &idx in indices {
            counts[self.labels[idx]] += 1;
        }
        counts
    }

    fn leaf(&self, counts: &[usize], total: usize) -> Node {
        let distribution = if total == 0 {
            vec![0.0; self.n_classes]
        } else {
            counts.iter().map(|&c| c as f64 / total as f64).collect()
        };
        Node::Leaf { distribution }
    }
}

/// Gini impurity: 1 - sum(p_k^2)
pub fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}
