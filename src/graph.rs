//! The mutable interaction network.

use crate::error::{EchoError, Result};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::HashMap;

/// Undirected, weighted network keyed by node name.
///
/// Indices are stable across removals, so the name index never needs
/// rebuilding. Nodes are never removed: dropping an edge can leave an
/// isolated node behind.
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    graph: StableUnGraph<String, f64>,
    index: HashMap<String, NodeIndex>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index for `name`, creating the node if needed.
    pub fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Adds an edge of weight 1. Returns `false` if the edge already existed,
    /// in which case nothing changes.
    pub fn add_edge(&mut self, u: &str, v: &str) -> bool {
        let a = self.ensure_node(u);
        let b = self.ensure_node(v);
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, 1.0);
        true
    }

    /// Adds `weight` to the edge, creating it if absent.
    pub fn add_weighted_edge(&mut self, u: &str, v: &str, weight: f64) {
        let a = self.ensure_node(u);
        let b = self.ensure_node(v);
        if let Some(edge) = self.graph.find_edge(a, b) {
            self.graph[edge] += weight;
        } else {
            self.graph.add_edge(a, b, weight);
        }
    }

    /// Inserts the edge if absent. An explicit `weight` replaces the
    /// current one; `None` leaves an existing edge alone and gives a new
    /// edge weight 1.
    pub fn set_edge(&mut self, u: &str, v: &str, weight: Option<f64>) {
        let a = self.ensure_node(u);
        let b = self.ensure_node(v);
        match (self.graph.find_edge(a, b), weight) {
            (Some(edge), Some(w)) => self.graph[edge] = w,
            (Some(_), None) => {}
            (None, w) => {
                self.graph.add_edge(a, b, w.unwrap_or(1.0));
            }
        }
    }

    pub fn has_edge(&self, u: &str, v: &str) -> bool {
        match (self.index.get(u), self.index.get(v)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Removes the edge and returns its weight.
    pub fn remove_edge(&mut self, u: &str, v: &str) -> Result<f64> {
        let edge = match (self.index.get(u), self.index.get(v)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b),
            _ => None,
        };
        edge.and_then(|e| self.graph.remove_edge(e))
            .ok_or_else(|| EchoError::EdgeNotFound(u.to_string(), v.to_string()))
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Sum of edge weights, each edge counted once.
    pub fn total_weight(&self) -> f64 {
        self.edges().map(|(_, _, w)| w).sum()
    }

    /// Node names in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_indices().map(move |idx| self.graph[idx].as_str())
    }

    /// Edges as `(u, v, weight)`. Order carries no meaning.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
                *e.weight(),
            )
        })
    }

    /// The underlying petgraph structure, for algorithms and rendering.
    pub fn inner(&self) -> &StableUnGraph<String, f64> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_creates_nodes() {
        let mut g = NetworkGraph::new();
        assert!(g.add_edge("alice", "bob"));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.contains_node("alice"));
        assert!(g.has_edge("bob", "alice"));
    }

    #[test]
    fn add_edge_is_idempotent() {
        let mut g = NetworkGraph::new();
        g.add_edge("a", "b");
        assert!(!g.add_edge("b", "a"));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.total_weight(), 1.0);
    }

    #[test]
    fn weighted_edges_accumulate() {
        let mut g = NetworkGraph::new();
        g.add_weighted_edge("a", "b", 2.0);
        g.add_weighted_edge("b", "a", 3.0);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.total_weight(), 5.0);
    }

    #[test]
    fn set_edge_replaces_only_explicit_weights() {
        let mut g = NetworkGraph::new();
        g.set_edge("a", "b", None);
        g.set_edge("b", "a", None);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.total_weight(), 1.0);

        g.set_edge("a", "b", Some(4.0));
        g.set_edge("b", "a", None);
        assert_eq!(g.total_weight(), 4.0);
    }

    #[test]
    fn remove_missing_edge_fails() {
        let mut g = NetworkGraph::new();
        g.add_edge("a", "b");
        g.add_edge("c", "d");
        assert!(matches!(
            g.remove_edge("a", "c"),
            Err(EchoError::EdgeNotFound(_, _))
        ));
        assert!(matches!(
            g.remove_edge("a", "zzz"),
            Err(EchoError::EdgeNotFound(_, _))
        ));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn remove_keeps_nodes_and_indices_valid() {
        let mut g = NetworkGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        assert_eq!(g.remove_edge("b", "a").unwrap(), 1.0);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 1);
        assert!(g.has_edge("c", "b"));
        assert!(g.add_edge("a", "c"));
        assert!(g.has_edge("a", "c"));
    }

    #[test]
    fn self_loop_is_a_single_edge() {
        let mut g = NetworkGraph::new();
        assert!(g.add_edge("a", "a"));
        assert!(!g.add_edge("a", "a"));
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![("a", "a", 1.0)]);
        g.remove_edge("a", "a").unwrap();
        assert_eq!(g.edge_count(), 0);
    }
}
