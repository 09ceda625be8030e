//! Edge-list input.
//!
//! Two dialects are accepted: whitespace-separated `u v [weight]` lines and
//! comma-separated `u,v[,weight]` records. Malformed lines are skipped and
//! counted rather than failing the whole load.
//!
//! A whitespace edge list describes a simple graph: a pair listed twice, in
//! either direction, is one edge, and a later explicit weight replaces an
//! earlier one. A CSV file is an interaction log, so repeated pairs add
//! their weights together.

use crate::error::{EchoError, Result};
use crate::graph::NetworkGraph;
use clap::ValueEnum;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeListFormat {
    #[default]
    Whitespace,
    Csv,
}

impl EdgeListFormat {
    /// Guess the dialect from a file extension; anything but `.csv` is
    /// treated as whitespace-separated.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => EdgeListFormat::Csv,
            _ => EdgeListFormat::Whitespace,
        }
    }
}

#[derive(Debug)]
pub struct ParsedNetwork {
    pub graph: NetworkGraph,
    pub skipped_lines: usize,
}

pub fn parse_edge_list<R: Read>(reader: R, format: EdgeListFormat) -> Result<ParsedNetwork> {
    let parsed = match format {
        EdgeListFormat::Whitespace => parse_whitespace(BufReader::new(reader))?,
        EdgeListFormat::Csv => parse_csv(reader)?,
    };

    if parsed.graph.is_empty() {
        return Err(EchoError::Parse {
            skipped: parsed.skipped_lines,
        });
    }

    info!(
        nodes = parsed.graph.node_count(),
        edges = parsed.graph.edge_count(),
        skipped = parsed.skipped_lines,
        "parsed edge list"
    );
    Ok(parsed)
}

/// Splits one record into `(u, v, weight)`, the weight only when given.
/// `None` means malformed.
fn edge_from_fields<'a, I>(mut fields: I) -> Option<(&'a str, &'a str, Option<f64>)>
where
    I: Iterator<Item = &'a str>,
{
    let u = fields.next().filter(|s| !s.is_empty())?;
    let v = fields.next().filter(|s| !s.is_empty())?;
    let weight = match fields.next() {
        None => None,
        Some(raw) => Some(raw.parse::<f64>().ok().filter(|w| w.is_finite() && *w > 0.0)?),
    };
    if fields.next().is_some() {
        return None;
    }
    Some((u, v, weight))
}

fn parse_whitespace<R: BufRead>(reader: R) -> Result<ParsedNetwork> {
    let mut graph = NetworkGraph::new();
    let mut skipped_lines = 0;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let content = match line.find('#') {
            Some(p) => &line[..p],
            None => line.as_str(),
        };
        if content.trim().is_empty() {
            continue;
        }
        match edge_from_fields(content.split_whitespace()) {
            Some((u, v, w)) => graph.set_edge(u, v, w),
            None => {
                debug!(line = lineno + 1, "skipping malformed edge line");
                skipped_lines += 1;
            }
        }
    }

    Ok(ParsedNetwork {
        graph,
        skipped_lines,
    })
}

fn parse_csv<R: Read>(reader: R) -> Result<ParsedNetwork> {
    let mut graph = NetworkGraph::new();
    let mut skipped_lines = 0;

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    for (lineno, record) in rdr.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        match edge_from_fields(record.iter()) {
            Some((u, v, w)) => graph.add_weighted_edge(u, v, w.unwrap_or(1.0)),
            None => {
                debug!(record = lineno + 1, "skipping malformed csv record");
                skipped_lines += 1;
            }
        }
    }

    Ok(ParsedNetwork {
        graph,
        skipped_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str, format: EdgeListFormat) -> Result<ParsedNetwork> {
        parse_edge_list(text.as_bytes(), format)
    }

    #[test]
    fn parses_four_cycle() {
        let parsed = parse_str("A B\nB C\nC D\nD A\n", EdgeListFormat::Whitespace)
            .unwrap();
        assert_eq!(parsed.graph.node_count(), 4);
        assert_eq!(parsed.graph.edge_count(), 4);
        assert_eq!(parsed.skipped_lines, 0);
    }

    #[test]
    fn tolerates_blank_comment_and_malformed_lines() {
        let text = "# header\n\nA\tB\nlonely\nB C 2.5 # weighted\nC D x\nD E 1 2\n";
        let parsed = parse_str(text, EdgeListFormat::Whitespace).unwrap();
        assert_eq!(parsed.graph.edge_count(), 2);
        assert_eq!(parsed.skipped_lines, 3);
        assert_eq!(parsed.graph.total_weight(), 3.5);
    }

    #[test]
    fn repeated_interactions_accumulate_weight() {
        let parsed = parse_str("a,b,2\nb,a,3\na,b\n", EdgeListFormat::Csv).unwrap();
        assert_eq!(parsed.graph.edge_count(), 1);
        assert_eq!(parsed.graph.total_weight(), 6.0);
    }

    #[test]
    fn repeated_and_reversed_lines_are_one_edge() {
        let parsed =
            parse_str("A B\nB C\nC D\nD A\nB A\nA B\n", EdgeListFormat::Whitespace).unwrap();
        assert_eq!(parsed.graph.edge_count(), 4);
        assert_eq!(parsed.graph.total_weight(), 4.0);
        assert_eq!(parsed.skipped_lines, 0);
    }

    #[test]
    fn later_explicit_weight_wins() {
        let parsed = parse_str("a b 2\nb a 3\na b\n", EdgeListFormat::Whitespace).unwrap();
        assert_eq!(parsed.graph.edge_count(), 1);
        assert_eq!(parsed.graph.total_weight(), 3.0);
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        let err = parse_str("\n# nothing\nsolo\n", EdgeListFormat::Whitespace)
            .unwrap_err();
        assert!(matches!(err, EchoError::Parse { skipped: 1 }));
    }

    #[test]
    fn parses_csv_interactions() {
        let text = "alice, bob, 3\nbob,carol\n,dave\ncarol,alice,abc\n";
        let parsed = parse_str(text, EdgeListFormat::Csv).unwrap();
        assert_eq!(parsed.graph.node_count(), 3);
        assert_eq!(parsed.graph.edge_count(), 2);
        assert_eq!(parsed.skipped_lines, 2);
        assert!(parsed.graph.has_edge("alice", "bob"));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(EdgeListFormat::from_path("net.CSV"), EdgeListFormat::Csv);
        assert_eq!(EdgeListFormat::from_path("net.edges"), EdgeListFormat::Whitespace);
        assert_eq!(EdgeListFormat::from_path("net"), EdgeListFormat::Whitespace);
    }
}
