//! Streaming half-space tree.
//!
//! A complete binary tree of fixed height over the unit cube. Each internal
//! node splits one random feature at a random point inside the node's
//! (padded) range. Every node counts how many points of the current window
//! passed through it (`l_mass`); when the window fills, those counts become
//! the reference profile (`r_mass`) that scoring reads. Memory is fixed by
//! the height; raw points are never kept.

use crate::random::RandomStream;

// fraction of a node's range kept clear of the split point on each side
const PADDING: f64 = 0.15;

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
}

#[derive(Debug, Clone)]
pub struct HalfSpaceTree {
    height: usize,
    splits: Vec<Split>,
    r_mass: Vec<u32>,
    l_mass: Vec<u32>,
    window_size: usize,
    size_limit: f64,
    filled: usize,
    has_reference: bool,
}

impl HalfSpaceTree {
    /// Grow a tree over `dims` unit-scaled features. `size_limit` is the
    /// fraction of `window_size` below which a walk stops descending.
    pub fn new(
        dims: usize,
        height: usize,
        window_size: usize,
        size_limit: f64,
        rng: &mut RandomStream,
    ) -> Self {
        let internal = (1usize << height) - 1;
        let nodes = (1usize << (height + 1)) - 1;
        let mut tree = Self {
            height,
            splits: vec![
                Split {
                    feature: 0,
                    threshold: 0.5,
                };
                internal
            ],
            r_mass: vec![0; nodes],
            l_mass: vec![0; nodes],
            window_size,
            size_limit: size_limit * window_size as f64,
            filled: 0,
            has_reference: false,
        };
        let mut limits = vec![(0.0, 1.0); dims.max(1)];
        tree.grow(0, 0, &mut limits, rng);
        tree
    }

    fn grow(&mut self, node: usize, depth: usize, limits: &mut [(f64, f64)], rng: &mut RandomStream) {
        if depth == self.height {
            return;
        }
        let feature = rng.uniform_int(0..limits.len());
        let (a, b) = limits[feature];
        let pad = PADDING * (b - a);
        let threshold = rng.uniform_range(a + pad, b - pad);
        self.splits[node] = Split { feature, threshold };

        limits[feature] = (a, threshold);
        self.grow(2 * node + 1, depth + 1, limits, rng);
        limits[feature] = (threshold, b);
        self.grow(2 * node + 2, depth + 1, limits, rng);
        limits[feature] = (a, b);
    }

    /// Node indices from the root to a leaf.
    fn path<'a>(&'a self, point: &'a [f64]) -> impl Iterator<Item = usize> + 'a {
        let mut node = 0usize;
        let mut depth = 0usize;
        std::iter::from_fn(move || {
            if depth > self.height {
                return None;
            }
            let current = node;
            if depth < self.height {
                let split = self.splits[current];
                let value = point.get(split.feature).copied().unwrap_or(0.5);
                node = if value < split.threshold {
                    2 * current + 1
                } else {
                    2 * current + 2
                };
            }
            depth += 1;
            Some(current)
        })
    }

    /// Isolation estimate in [0, 1] against the reference profile; 0.0 until
    /// the first window has completed.
    pub fn score(&self, point: &[f64]) -> f64 {
        if !self.has_reference {
            return 0.0;
        }
        let mut mass = 0.0;
        for (depth, node) in self.path(point).enumerate() {
            let r = f64::from(self.r_mass[node]);
            mass += r * (1u64 << depth) as f64;
            if r < self.size_limit {
                break;
            }
        }
        (1.0 - mass / self.max_mass()).clamp(0.0, 1.0)
    }

    pub fn learn(&mut self, point: &[f64]) {
        let path: Vec<usize> = self.path(point).collect();
        for node in path {
            self.l_mass[node] += 1;
        }
        self.filled += 1;
        if self.filled == self.window_size {
            std::mem::swap(&mut self.r_mass, &mut self.l_mass);
            self.l_mass.iter_mut().for_each(|m| *m = 0);
            self.filled = 0;
            self.has_reference = true;
        }
    }

    pub fn has_reference(&self) -> bool {
        self.has_reference
    }

    pub fn node_count(&self) -> usize {
        self.r_mass.len()
    }

    fn max_mass(&self) -> f64 {
        self.window_size as f64 * ((1u64 << (self.height + 1)) - 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_node_count() {
        let mut rng = RandomStream::new(1);
        let tree = HalfSpaceTree::new(2, 4, 16, 0.1, &mut rng);
        assert_eq!(tree.node_count(), 31);
    }

    #[test]
    fn cold_until_first_window() {
        let mut rng = RandomStream::new(1);
        let mut tree = HalfSpaceTree::new(2, 4, 8, 0.1, &mut rng);
        for _ in 0..8 {
            assert_eq!(tree.score(&[0.5, 0.5]), 0.0);
            tree.learn(&[0.5, 0.5]);
        }
        assert!(tree.has_reference());
    }

    #[test]
    fn dense_region_scores_lower() {
        let mut rng = RandomStream::new(2);
        let mut trees: Vec<HalfSpaceTree> = (0..10)
            .map(|_| HalfSpaceTree::new(2, 6, 64, 0.1, &mut rng))
            .collect();
        for _ in 0..64 {
            let p = [0.5 + rng.normal(0.0, 0.005), 0.5 + rng.normal(0.0, 0.005)];
            trees.iter_mut().for_each(|t| t.learn(&p));
        }
        let inside: f64 = trees.iter().map(|t| t.score(&[0.5, 0.5])).sum::<f64>() / 10.0;
        let outside: f64 = trees.iter().map(|t| t.score(&[1.0, 1.0])).sum::<f64>() / 10.0;
        assert!(outside > inside, "outside={outside} inside={inside}");
        assert!((0.0..=1.0).contains(&inside));
        assert!((0.0..=1.0).contains(&outside));
    }
}
