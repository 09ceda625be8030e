//! Graphviz output.
//!
//! Nodes are colored by the partition they are given, which for a session
//! is always the one captured at load time. Nodes without a community are
//! drawn gray and dashed.

use crate::community::Partition;
use crate::error::Result;
use crate::graph::NetworkGraph;
use petgraph::dot::{Config, Dot};
use petgraph::stable_graph::NodeIndex;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// Graphviz HSV fill for a community; consecutive ids land far apart on
/// the hue circle.
fn community_color(id: usize) -> String {
    let hue = (id as f64 * GOLDEN_RATIO_CONJUGATE).fract();
    format!("{hue:.3} 0.5 0.8")
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn to_dot(graph: &NetworkGraph, partition: &Partition) -> String {
    let node_attrs = |_, (_, name): (NodeIndex, &String)| match partition.get(name) {
        Some(id) => format!(
            "label=\"{}\", tooltip=\"community {}\", style=filled, fillcolor=\"{}\"",
            escape(name),
            id,
            community_color(id)
        ),
        None => format!(
            "label=\"{}\", tooltip=\"unassigned\", style=\"filled,dashed\", fillcolor=\"lightgray\"",
            escape(name)
        ),
    };
    let dot = Dot::with_attr_getters(
        graph.inner(),
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        &|_, edge| {
            let w = *edge.weight();
            if (w - 1.0).abs() > f64::EPSILON {
                format!("label=\"{w}\"")
            } else {
                String::new()
            }
        },
        &node_attrs,
    );
    format!("{dot:?}")
}

pub fn write_dot<P: AsRef<Path>>(path: P, graph: &NetworkGraph, partition: &Partition) -> Result<()> {
    std::fs::write(path.as_ref(), to_dot(graph, partition))?;
    info!(path = %path.as_ref().display(), "wrote dot file");
    Ok(())
}

/// Renders a DOT file to PNG with the `dot` binary.
pub fn render_png<P: AsRef<Path>, Q: AsRef<Path>>(dot_file: P, output_image: Q) -> Result<()> {
    let status = Command::new("dot")
        .arg("-Tpng")
        .arg(dot_file.as_ref())
        .arg("-o")
        .arg(output_image.as_ref())
        .status()?;
    if !status.success() {
        warn!(%status, "graphviz exited with an error");
        return Err(std::io::Error::other(format!("dot exited with {status}")).into());
    }
    Ok(())
}
