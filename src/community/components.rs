use super::{CommunityDetection, Partition};
use crate::error::{EchoError, Result};
use crate::graph::NetworkGraph;
use petgraph::algo::tarjan_scc;

/// One community per connected component.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl CommunityDetection for ConnectedComponents {
    fn detect(&self, graph: &NetworkGraph) -> Result<Partition> {
        if graph.is_empty() {
            return Err(EchoError::EmptyGraph);
        }

        let inner = graph.inner();
        // On an undirected graph every strongly connected component is a
        // connected component.
        let mut components = tarjan_scc(inner);
        for component in &mut components {
            component.sort();
        }
        components.sort_by_key(|c| c[0]);

        Ok(components
            .iter()
            .enumerate()
            .flat_map(|(id, nodes)| nodes.iter().map(move |&idx| (inner[idx].clone(), id)))
            .collect())
    }

    fn name(&self) -> &'static str {
        "components"
    }
}
