//! Echo-chamber analysis for interaction networks.
//!
//! Load an edge list, detect communities once, then edit the network and
//! watch modularity, polarization (community-label assortativity) and the
//! set of bridge edges respond, while community membership stays fixed.

pub mod analysis;
pub mod community;
pub mod config;
pub mod error;
pub mod generate;
pub mod graph;
pub mod metrics;
pub mod parser;
pub mod render;
pub mod session;

pub use analysis::{detect_and_analyze, recalculate, AnalysisResult};
pub use community::{CommunityDetection, CommunityId, ConnectedComponents, Louvain, Partition};
pub use config::{Algorithm, AnalyzerConfig};
pub use error::{EchoError, Result};
pub use graph::NetworkGraph;
pub use metrics::{BridgeEdge, Metric, UndefinedReason};
pub use parser::{parse_edge_list, EdgeListFormat, ParsedNetwork};
pub use session::{BridgeRow, EditOutcome, NetworkReport, Session, SessionState};
