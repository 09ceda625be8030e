use super::Partition;
use crate::error::Result;
use crate::graph::NetworkGraph;

/// A community detection routine.
///
/// Implementations must assign every node of `graph` to some community.
pub trait CommunityDetection {
    fn detect(&self, graph: &NetworkGraph) -> Result<Partition>;

    fn name(&self) -> &'static str;
}

impl<D: CommunityDetection + ?Sized> CommunityDetection for Box<D> {
    fn detect(&self, graph: &NetworkGraph) -> Result<Partition> {
        (**self).detect(graph)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
