//! Louvain modularity optimization.
//!
//! 1. **Local moving**: every node starts alone and is repeatedly moved to
//!    the neighboring community with the best modularity gain.
//! 2. **Aggregation**: communities collapse into single nodes; internal
//!    edges become self-loops.
//!
//! Levels repeat until modularity stops improving. Nodes are visited in a
//! shuffled order drawn from a seeded RNG so results are reproducible.

use super::{CommunityDetection, Partition};
use crate::error::{EchoError, Result};
use crate::graph::NetworkGraph;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Louvain {
    resolution: f64,
    max_iter: usize,
    max_levels: usize,
    min_modularity_gain: f64,
    seed: u64,
}

impl Louvain {
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            max_iter: 100,
            max_levels: 10,
            min_modularity_gain: 1e-7,
            seed: 42,
        }
    }

    /// Higher values produce smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

/// Weighted graph over dense indices, as seen at one aggregation level.
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
    degrees: Vec<f64>,
    /// Total edge weight, each edge and self-loop counted once.
    m: f64,
}

impl Level {
    fn new(n: usize, edges: &[(usize, usize, f64)], self_loops: Vec<f64>) -> Self {
        let mut adj = vec![Vec::new(); n];
        let mut degrees = vec![0.0; n];
        for &(i, j, w) in edges {
            adj[i].push((j, w));
            adj[j].push((i, w));
            degrees[i] += w;
            degrees[j] += w;
        }
        for (i, &sl) in self_loops.iter().enumerate() {
            degrees[i] += 2.0 * sl;
        }
        let m = edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>();
        Level {
            adj,
            self_loops,
            degrees,
            m,
        }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn modularity(&self, communities: &[usize], resolution: f64) -> f64 {
        if self.m == 0.0 {
            return 0.0;
        }
        let k = communities.iter().copied().max().map_or(0, |c| c + 1);
        let mut internal = vec![0.0; k];
        let mut totals = vec![0.0; k];
        for i in 0..self.len() {
            let c = communities[i];
            totals[c] += self.degrees[i];
            internal[c] += self.self_loops[i];
            for &(j, w) in &self.adj[i] {
                // each edge is seen from both ends
                if communities[j] == c {
                    internal[c] += w / 2.0;
                }
            }
        }
        let two_m = 2.0 * self.m;
        internal
            .iter()
            .zip(&totals)
            .map(|(&in_c, &tot)| in_c / self.m - resolution * (tot / two_m).powi(2))
            .sum()
    }
}

impl Louvain {
    /// Phase 1. Returns the community of every level node and whether
    /// anything moved.
    fn local_moving(&self, level: &Level, rng: &mut StdRng) -> (Vec<usize>, bool) {
        let n = level.len();
        let mut communities: Vec<usize> = (0..n).collect();
        if level.m == 0.0 {
            return (communities, false);
        }

        let m = level.m;
        let mut community_degrees = level.degrees.clone();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        // Scratch space for weights towards neighboring communities.
        let mut neighbor_weight = vec![0.0; n];
        let mut touched: Vec<usize> = Vec::new();
        let mut any_moved = false;

        for _ in 0..self.max_iter {
            let mut moved = false;

            for &node in &order {
                let current = communities[node];
                let ki = level.degrees[node];
                community_degrees[current] -= ki;

                for &(neighbor, w) in &level.adj[node] {
                    let c = communities[neighbor];
                    if neighbor_weight[c] == 0.0 {
                        touched.push(c);
                    }
                    neighbor_weight[c] += w;
                }

                let gain_of = |c: usize| {
                    neighbor_weight[c] / m
                        - self.resolution * community_degrees[c] * ki / (2.0 * m * m)
                };
                let mut best = current;
                let mut best_gain = gain_of(current);
                for &c in &touched {
                    let gain = gain_of(c);
                    if gain > best_gain {
                        best_gain = gain;
                        best = c;
                    }
                }
                for c in touched.drain(..) {
                    neighbor_weight[c] = 0.0;
                }

                community_degrees[best] += ki;
                if best != current {
                    communities[node] = best;
                    moved = true;
                    any_moved = true;
                }
            }

            if !moved {
                break;
            }
        }

        (communities, any_moved)
    }

    /// Phase 2. Collapses each community into one node.
    fn aggregate(level: &Level, communities: &[usize]) -> Level {
        let k = communities.iter().copied().max().map_or(0, |c| c + 1);
        let mut self_loops = vec![0.0; k];
        let mut between: HashMap<(usize, usize), f64> = HashMap::new();

        for i in 0..level.len() {
            let ci = communities[i];
            self_loops[ci] += level.self_loops[i];
            for &(j, w) in &level.adj[i] {
                let cj = communities[j];
                if ci == cj {
                    self_loops[ci] += w / 2.0;
                } else if ci < cj {
                    *between.entry((ci, cj)).or_insert(0.0) += w;
                }
            }
        }

        let mut edges: Vec<(usize, usize, f64)> =
            between.into_iter().map(|((a, b), w)| (a, b, w)).collect();
        edges.sort_by_key(|&(a, b, _)| (a, b));
        Level::new(k, &edges, self_loops)
    }
}

/// Relabels communities to `0..k` in order of first appearance.
fn compact(communities: &mut [usize]) {
    let mut remap: HashMap<usize, usize> = HashMap::new();
    for c in communities.iter_mut() {
        let next = remap.len();
        *c = *remap.entry(*c).or_insert(next);
    }
}

impl CommunityDetection for Louvain {
    fn detect(&self, graph: &NetworkGraph) -> Result<Partition> {
        let n = graph.node_count();
        if n == 0 {
            return Err(EchoError::EmptyGraph);
        }

        let names: Vec<&str> = graph.nodes().collect();
        let position: HashMap<&str, usize> =
            names.iter().enumerate().map(|(i, &name)| (name, i)).collect();

        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut self_loops = vec![0.0; n];
        for (u, v, w) in graph.edges() {
            let (i, j) = (position[u], position[v]);
            if i == j {
                self_loops[i] += w;
            } else {
                edges.push((i, j, w));
            }
        }

        let mut level = Level::new(n, &edges, self_loops);
        let mut membership: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);

        for depth in 0..self.max_levels {
            let identity: Vec<usize> = (0..level.len()).collect();
            let before = level.modularity(&identity, self.resolution);

            let (mut communities, moved) = self.local_moving(&level, &mut rng);
            if !moved {
                break;
            }
            compact(&mut communities);

            let after = level.modularity(&communities, self.resolution);
            if after - before < self.min_modularity_gain {
                break;
            }
            debug!(depth, modularity = after, "louvain level complete");

            for c in membership.iter_mut() {
                *c = communities[*c];
            }
            level = Self::aggregate(&level, &communities);
        }

        Ok(Partition::from_labels(
            names.into_iter().zip(membership.into_iter()),
        ))
    }

    fn name(&self) -> &'static str {
        "louvain"
    }
}
