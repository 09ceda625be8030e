//! Interactive analysis session.
//!
//! A session is either empty or holds one loaded network together with the
//! partition detected when it was loaded. Edits mutate the network and
//! rescore it against that same partition; only a new load replaces it.

use crate::analysis::{self, AnalysisResult};
use crate::community::{CommunityDetection, CommunityId, Louvain, Partition};
use crate::error::{EchoError, Result};
use crate::graph::NetworkGraph;
use crate::parser::{self, EdgeListFormat};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A network plus the partition captured when it was loaded.
#[derive(Debug, Clone)]
pub struct LoadedNetwork {
    graph: NetworkGraph,
    partition: Arc<Partition>,
    result: AnalysisResult,
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Loaded(LoadedNetwork),
}

/// What an edit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Added,
    /// The edge was already there; the graph is unchanged.
    AlreadyPresent,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeRow {
    pub node1: String,
    pub community1: Option<CommunityId>,
    pub node2: String,
    pub community2: Option<CommunityId>,
}

/// Everything the user sees after an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkReport {
    pub nodes: usize,
    pub edges: usize,
    pub communities: usize,
    pub modularity: f64,
    pub polarization_score: f64,
    pub bridges: Vec<BridgeRow>,
}

pub struct Session<D = Louvain> {
    detector: D,
    resolution: f64,
    format: EdgeListFormat,
    state: SessionState,
    detections: usize,
    recalculations: usize,
}

impl Session<Louvain> {
    pub fn new() -> Self {
        Self::with_detector(Louvain::new())
    }
}

impl Default for Session<Louvain> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: CommunityDetection> Session<D> {
    pub fn with_detector(detector: D) -> Self {
        Session {
            detector,
            resolution: 1.0,
            format: EdgeListFormat::Whitespace,
            state: SessionState::Empty,
            detections: 0,
            recalculations: 0,
        }
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_format(mut self, format: EdgeListFormat) -> Self {
        self.format = format;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, SessionState::Loaded(_))
    }

    pub fn graph(&self) -> Option<&NetworkGraph> {
        self.loaded().map(|l| &l.graph)
    }

    /// The partition detected at load time.
    pub fn partition(&self) -> Option<&Arc<Partition>> {
        self.loaded().map(|l| &l.partition)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.loaded().map(|l| &l.result)
    }

    /// Number of times community detection has run.
    pub fn detections(&self) -> usize {
        self.detections
    }

    /// Number of incremental rescoring passes.
    pub fn recalculations(&self) -> usize {
        self.recalculations
    }

    fn loaded(&self) -> Option<&LoadedNetwork> {
        match &self.state {
            SessionState::Loaded(l) => Some(l),
            SessionState::Empty => None,
        }
    }

    /// Loads a network, replacing whatever was loaded before.
    ///
    /// On failure the previous state is left untouched.
    pub fn load_reader<R: Read>(&mut self, reader: R) -> Result<&AnalysisResult> {
        let parsed = parser::parse_edge_list(reader, self.format)?;
        let (partition, result) =
            analysis::detect_and_analyze(&parsed.graph, &self.detector, self.resolution)?;
        self.detections += 1;

        info!(
            nodes = parsed.graph.node_count(),
            edges = parsed.graph.edge_count(),
            modularity = result.modularity_score(),
            polarization = result.polarization_score(),
            "network loaded"
        );
        self.state = SessionState::Loaded(LoadedNetwork {
            graph: parsed.graph,
            partition: Arc::new(partition),
            result,
        });
        self.result().ok_or(EchoError::NotLoaded)
    }

    pub fn load_str(&mut self, text: &str) -> Result<&AnalysisResult> {
        self.load_reader(text.as_bytes())
    }

    pub fn load_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&AnalysisResult> {
        let file = File::open(path)?;
        self.load_reader(file)
    }

    pub fn add_edge(&mut self, u: &str, v: &str) -> Result<EditOutcome> {
        let (u, v) = require_nodes(u, v)?;
        let resolution = self.resolution;
        let loaded = self.loaded_mut()?;

        if !loaded.graph.add_edge(u, v) {
            debug!(u, v, "edge already present");
            return Ok(EditOutcome::AlreadyPresent);
        }
        loaded.rescore(resolution);
        self.recalculations += 1;
        info!(u, v, "edge added");
        Ok(EditOutcome::Added)
    }

    pub fn remove_edge(&mut self, u: &str, v: &str) -> Result<EditOutcome> {
        let (u, v) = require_nodes(u, v)?;
        let resolution = self.resolution;
        let loaded = self.loaded_mut()?;

        if !loaded.graph.has_edge(u, v) {
            return Err(EchoError::EdgeNotFound(u.to_string(), v.to_string()));
        }
        loaded.graph.remove_edge(u, v)?;
        loaded.rescore(resolution);
        self.recalculations += 1;
        info!(u, v, "edge removed");
        Ok(EditOutcome::Removed)
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedNetwork> {
        match &mut self.state {
            SessionState::Loaded(l) => Ok(l),
            SessionState::Empty => Err(EchoError::NotLoaded),
        }
    }

    pub fn report(&self) -> Option<NetworkReport> {
        let loaded = self.loaded()?;
        let partition = &loaded.partition;
        let bridges = loaded
            .result
            .bridges
            .iter()
            .map(|b| BridgeRow {
                node1: b.source.clone(),
                community1: partition.get(&b.source),
                node2: b.target.clone(),
                community2: partition.get(&b.target),
            })
            .collect();

        Some(NetworkReport {
            nodes: loaded.graph.node_count(),
            edges: loaded.graph.edge_count(),
            communities: partition.community_count(),
            modularity: loaded.result.modularity_score(),
            polarization_score: loaded.result.polarization_score(),
            bridges,
        })
    }
}

impl LoadedNetwork {
    fn rescore(&mut self, resolution: f64) {
        self.result = analysis::recalculate(&self.graph, &self.partition, resolution);
    }
}

fn require_nodes<'a>(u: &'a str, v: &'a str) -> Result<(&'a str, &'a str)> {
    let (u, v) = (u.trim(), v.trim());
    if u.is_empty() || v.is_empty() {
        warn!("edit ignored: both node names are required");
        return Err(EchoError::MissingInput);
    }
    Ok((u, v))
}
