//! Full and incremental analysis passes.
//!
//! [`detect_and_analyze`] is the expensive path: it runs community detection
//! and then scores the result. [`recalculate`] is the cheap path used after
//! every edit: it scores the graph against a partition it is handed and
//! never runs detection.

use crate::community::{CommunityDetection, Partition};
use crate::error::Result;
use crate::graph::NetworkGraph;
use crate::metrics::{self, BridgeEdge, Metric};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub modularity: Metric,
    pub polarization: Metric,
    pub bridges: Vec<BridgeEdge>,
}

impl AnalysisResult {
    pub fn modularity_score(&self) -> f64 {
        self.modularity.value()
    }

    /// Assortativity of the community label; 0.0 when undefined.
    pub fn polarization_score(&self) -> f64 {
        self.polarization.value()
    }

    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }
}

pub fn detect_and_analyze<D>(
    graph: &NetworkGraph,
    detector: &D,
    resolution: f64,
) -> Result<(Partition, AnalysisResult)>
where
    D: CommunityDetection + ?Sized,
{
    let partition = detector.detect(graph)?;
    info!(
        algorithm = detector.name(),
        nodes = partition.len(),
        communities = partition.community_count(),
        "communities detected"
    );
    let result = recalculate(graph, &partition, resolution);
    Ok((partition, result))
}

pub fn recalculate(graph: &NetworkGraph, partition: &Partition, resolution: f64) -> AnalysisResult {
    let modularity = metrics::modularity(graph, partition, resolution);
    let polarization = metrics::attribute_assortativity(graph, partition);
    for (name, metric) in [("modularity", &modularity), ("polarization", &polarization)] {
        if let Metric::Undefined(reason) = metric {
            warn!(metric = name, %reason, "metric undefined, reporting 0.0");
        }
    }

    let bridges = metrics::find_bridges(graph, partition);
    debug!(
        modularity = modularity.value(),
        polarization = polarization.value(),
        bridges = bridges.len(),
        "metrics recalculated"
    );
    AnalysisResult {
        modularity,
        polarization,
        bridges,
    }
}
