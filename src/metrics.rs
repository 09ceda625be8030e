//! Partition-dependent network statistics.
//!
//! Every function here takes the partition as given and never detects
//! communities itself. Nodes without an assignment are skipped.

use crate::community::{CommunityId, Partition};
use crate::graph::NetworkGraph;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Why a statistic has no value for the current graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// The graph has no edge weight at all.
    NoEdges,
    /// No edge has both endpoints assigned to a community.
    NoAssignedEdges,
    /// All assigned edge endpoints share one community.
    ZeroVariance,
    NonFinite,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedReason::NoEdges => write!(f, "graph has no edges"),
            UndefinedReason::NoAssignedEdges => {
                write!(f, "no edge joins two assigned nodes")
            }
            UndefinedReason::ZeroVariance => write!(f, "community labels have zero variance"),
            UndefinedReason::NonFinite => write!(f, "result was not finite"),
        }
    }
}

/// A statistic that may be undefined on degenerate graphs.
///
/// Undefined values read as exactly `0.0` through [`Metric::value`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Metric {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl Metric {
    fn checked(value: f64) -> Self {
        if value.is_finite() {
            Metric::Defined(value)
        } else {
            Metric::Undefined(UndefinedReason::NonFinite)
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Metric::Defined(v) => v,
            Metric::Undefined(_) => 0.0,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Defined(_))
    }
}

/// An edge whose endpoints sit in different communities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BridgeEdge {
    pub source: String,
    pub source_community: CommunityId,
    pub target: String,
    pub target_community: CommunityId,
}

/// Weighted modularity of `partition` over `graph`.
///
/// `Q = Σ_c [ in_c / m - γ (deg_c / 2m)² ]`. Unassigned nodes still count
/// towards `m` but belong to no community.
pub fn modularity(graph: &NetworkGraph, partition: &Partition, resolution: f64) -> Metric {
    let m = graph.total_weight();
    if m <= 0.0 {
        return Metric::Undefined(UndefinedReason::NoEdges);
    }

    // Ordered maps and edge-order accumulation keep the float sums
    // reproducible between calls on the same graph.
    let mut internal: BTreeMap<CommunityId, f64> = BTreeMap::new();
    let mut totals: BTreeMap<CommunityId, f64> = BTreeMap::new();

    for (u, v, w) in graph.edges() {
        let (cu, cv) = (partition.get(u), partition.get(v));
        if let Some(c) = cu {
            *totals.entry(c).or_insert(0.0) += w;
        }
        if let Some(c) = cv {
            *totals.entry(c).or_insert(0.0) += w;
        }
        match (cu, cv) {
            (Some(cu), Some(cv)) if cu == cv => *internal.entry(cu).or_insert(0.0) += w,
            _ => {}
        }
    }

    let two_m = 2.0 * m;
    let q = totals
        .iter()
        .map(|(c, &tot)| {
            let in_c = internal.get(c).copied().unwrap_or(0.0);
            in_c / m - resolution * (tot / two_m).powi(2)
        })
        .sum();
    Metric::checked(q)
}

/// Attribute assortativity of the community label.
///
/// Builds the normalized mixing matrix `e` over edges (both directions for
/// ordinary edges, once for a self-loop, unweighted) and returns
/// `r = (Σ e_ii - Σ a_i b_i) / (1 - Σ a_i b_i)`.
pub fn attribute_assortativity(graph: &NetworkGraph, partition: &Partition) -> Metric {
    if graph.edge_count() == 0 {
        return Metric::Undefined(UndefinedReason::NoEdges);
    }

    let mut mixing: BTreeMap<(CommunityId, CommunityId), f64> = BTreeMap::new();
    let mut total = 0.0;
    for (u, v, _) in graph.edges() {
        let (Some(cu), Some(cv)) = (partition.get(u), partition.get(v)) else {
            continue;
        };
        *mixing.entry((cu, cv)).or_insert(0.0) += 1.0;
        total += 1.0;
        if u != v {
            *mixing.entry((cv, cu)).or_insert(0.0) += 1.0;
            total += 1.0;
        }
    }
    if total == 0.0 {
        return Metric::Undefined(UndefinedReason::NoAssignedEdges);
    }

    let mut rows: BTreeMap<CommunityId, f64> = BTreeMap::new();
    let mut cols: BTreeMap<CommunityId, f64> = BTreeMap::new();
    let mut trace = 0.0;
    for (&(i, j), &count) in &mixing {
        let e = count / total;
        *rows.entry(i).or_insert(0.0) += e;
        *cols.entry(j).or_insert(0.0) += e;
        if i == j {
            trace += e;
        }
    }
    let expected: f64 = rows
        .iter()
        .map(|(c, a)| a * cols.get(c).copied().unwrap_or(0.0))
        .sum();

    let denominator = 1.0 - expected;
    if denominator.abs() < 1e-12 {
        return Metric::Undefined(UndefinedReason::ZeroVariance);
    }
    Metric::checked((trace - expected) / denominator)
}

/// Edges joining two different communities, sorted.
///
/// Edges with an unassigned endpoint are not bridges.
pub fn find_bridges(graph: &NetworkGraph, partition: &Partition) -> Vec<BridgeEdge> {
    let mut bridges: Vec<BridgeEdge> = graph
        .edges()
        .filter_map(|(u, v, _)| {
            let (cu, cv) = (partition.get(u)?, partition.get(v)?);
            (cu != cv).then(|| BridgeEdge {
                source: u.to_string(),
                source_community: cu,
                target: v.to_string(),
                target_community: cv,
            })
        })
        .collect();
    bridges.sort();
    bridges
}
