//! Session behavior across edits: the partition detected at load time is
//! the only one ever used, and metrics follow the edited graph.

use echo_chamber::{
    recalculate, CommunityDetection, EchoError, EditOutcome, Louvain, NetworkGraph, Partition,
    Result, Session,
};
use proptest::prelude::*;
use std::cell::Cell;

/// Hands out a fixed partition and counts how often it was asked.
struct FixedPartition {
    partition: Partition,
    calls: Cell<usize>,
}

impl FixedPartition {
    fn new(assignments: &[(&str, usize)]) -> Self {
        FixedPartition {
            partition: assignments.iter().map(|&(n, c)| (n, c)).collect(),
            calls: Cell::new(0),
        }
    }
}

impl CommunityDetection for FixedPartition {
    fn detect(&self, _graph: &NetworkGraph) -> Result<Partition> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.partition.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

const FOUR_CYCLE: &str = "A B\nB C\nC D\nD A\n";

fn four_cycle_session() -> Session<FixedPartition> {
    let mut session = Session::with_detector(FixedPartition::new(&[
        ("A", 0),
        ("B", 0),
        ("C", 1),
        ("D", 1),
    ]));
    session.load_str(FOUR_CYCLE).unwrap();
    session
}

fn bridge_pairs(session: &Session<FixedPartition>) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = session
        .result()
        .unwrap()
        .bridges
        .iter()
        .map(|b| {
            if b.source <= b.target {
                (b.source.clone(), b.target.clone())
            } else {
                (b.target.clone(), b.source.clone())
            }
        })
        .collect();
    pairs.sort();
    pairs
}

fn pair(u: &str, v: &str) -> (String, String) {
    (u.to_string(), v.to_string())
}

#[test]
fn four_cycle_with_two_pairs() {
    let session = four_cycle_session();
    let result = session.result().unwrap();

    assert_eq!(bridge_pairs(&session), vec![pair("A", "D"), pair("B", "C")]);
    // 2 * (1/4 - (4/8)^2)
    assert!(result.modularity_score().abs() < 1e-12);
    // trace 1/2, Σ a_i b_i = 1/2
    assert!(result.polarization_score().abs() < 1e-12);
    assert!(result.polarization.is_defined());
}

#[test]
fn repeated_edge_lines_do_not_change_the_metrics() {
    let plain = four_cycle_session();
    let mut repeated = Session::with_detector(FixedPartition::new(&[
        ("A", 0),
        ("B", 0),
        ("C", 1),
        ("D", 1),
    ]));
    repeated.load_str("A B\nB C\nC D\nD A\nB A\nC B\n").unwrap();

    assert_eq!(repeated.graph().unwrap().edge_count(), 4);
    assert_eq!(repeated.result().unwrap(), plain.result().unwrap());
    assert_eq!(repeated.result().unwrap().modularity_score(), 0.0);
}

#[test]
fn louvain_covers_exactly_the_four_cycle() {
    let mut session = Session::new();
    session.load_str(FOUR_CYCLE).unwrap();
    let partition = session.partition().unwrap();

    assert_eq!(partition.len(), 4);
    for node in ["A", "B", "C", "D"] {
        assert!(partition.contains(node));
    }
    let expected = session
        .graph()
        .unwrap()
        .edges()
        .filter(|(u, v, _)| partition.get(u) != partition.get(v))
        .count();
    assert_eq!(session.result().unwrap().bridge_count(), expected);
}

#[test]
fn single_community_polarization_is_exactly_zero() {
    let mut session = Session::with_detector(FixedPartition::new(&[
        ("A", 0),
        ("B", 0),
        ("C", 0),
        ("D", 0),
    ]));
    session.load_str(FOUR_CYCLE).unwrap();
    let result = session.result().unwrap();

    assert_eq!(result.polarization_score(), 0.0);
    assert!(!result.polarization.is_defined());
    assert!(result.bridges.is_empty());
}

#[test]
fn edits_never_rerun_detection() {
    let mut session = four_cycle_session();
    session.add_edge("A", "C").unwrap();
    session.add_edge("X", "Y").unwrap();
    session.remove_edge("A", "B").unwrap();

    assert_eq!(session.detections(), 1);
    assert_eq!(session.recalculations(), 3);
    assert_eq!(session.partition().unwrap().len(), 4);
}

#[test]
fn adding_cross_community_edge_adds_a_bridge() {
    let mut session = four_cycle_session();
    assert_eq!(session.add_edge("A", "C").unwrap(), EditOutcome::Added);
    assert_eq!(
        bridge_pairs(&session),
        vec![pair("A", "C"), pair("A", "D"), pair("B", "C")]
    );
}

#[test]
fn removing_bridge_and_non_bridge() {
    let mut session = four_cycle_session();

    session.remove_edge("C", "B").unwrap();
    assert_eq!(bridge_pairs(&session), vec![pair("A", "D")]);

    session.remove_edge("A", "B").unwrap();
    assert_eq!(bridge_pairs(&session), vec![pair("A", "D")]);
    assert_eq!(session.graph().unwrap().node_count(), 4);
}

#[test]
fn removing_missing_edge_changes_nothing() {
    let mut session = four_cycle_session();
    let before = session.report().unwrap();

    let err = session.remove_edge("A", "C").unwrap_err();
    assert!(matches!(err, EchoError::EdgeNotFound(_, _)));
    assert_eq!(err.to_string(), "edge (A, C) does not exist");
    assert_eq!(session.report().unwrap(), before);
    assert_eq!(session.recalculations(), 0);
}

#[test]
fn edges_between_new_nodes_are_not_bridges() {
    let mut session = four_cycle_session();
    session.add_edge("new1", "new2").unwrap();
    session.add_edge("new1", "A").unwrap();

    assert_eq!(bridge_pairs(&session), vec![pair("A", "D"), pair("B", "C")]);
    let report = session.report().unwrap();
    assert_eq!(report.nodes, 6);
    assert_eq!(report.edges, 6);
    assert_eq!(report.communities, 2);
}

#[test]
fn bridge_rows_carry_both_community_ids() {
    let session = four_cycle_session();
    for row in session.report().unwrap().bridges {
        assert!(row.community1.is_some());
        assert!(row.community2.is_some());
        assert_ne!(row.community1, row.community2);
    }
}

fn edge_list() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0u8..10, 0u8..10), 1..40)
}

fn to_text(edges: &[(u8, u8)]) -> String {
    edges.iter().map(|(u, v)| format!("n{u} n{v}\n")).collect()
}

proptest! {
    #[test]
    fn prop_recalculate_matches_full_analysis(edges in edge_list(), seed in 0u64..1000) {
        let mut session = Session::with_detector(Louvain::new().with_seed(seed));
        session.load_str(&to_text(&edges)).unwrap();

        let graph = session.graph().unwrap();
        let partition = session.partition().unwrap();
        let incremental = recalculate(graph, partition, 1.0);
        prop_assert_eq!(&incremental, session.result().unwrap());
        prop_assert!(graph.nodes().all(|n| partition.contains(n)));
    }

    #[test]
    fn prop_new_cross_edge_adds_one_bridge(edges in edge_list(), u in 0u8..10, v in 0u8..10) {
        let mut session = Session::new();
        session.load_str(&to_text(&edges)).unwrap();
        let (u, v) = (format!("n{u}"), format!("n{v}"));

        let partition = session.partition().unwrap();
        let cross = matches!(
            (partition.get(&u), partition.get(&v)),
            (Some(a), Some(b)) if a != b
        );
        prop_assume!(cross);
        prop_assume!(!session.graph().unwrap().has_edge(&u, &v));

        let before = session.result().unwrap().bridge_count();
        session.add_edge(&u, &v).unwrap();
        prop_assert_eq!(session.result().unwrap().bridge_count(), before + 1);
    }

    #[test]
    fn prop_removal_drops_only_bridges(edges in edge_list(), pick in any::<prop::sample::Index>()) {
        let mut session = Session::new();
        session.load_str(&to_text(&edges)).unwrap();

        let (u, v) = {
            let graph = session.graph().unwrap();
            let all: Vec<(String, String)> = graph
                .edges()
                .map(|(u, v, _)| (u.to_string(), v.to_string()))
                .collect();
            all[pick.index(all.len())].clone()
        };
        let partition = session.partition().unwrap();
        let was_bridge = partition.get(&u) != partition.get(&v);

        let before = session.result().unwrap().bridge_count();
        session.remove_edge(&u, &v).unwrap();
        let after = session.result().unwrap().bridge_count();
        prop_assert_eq!(after, if was_bridge { before - 1 } else { before });
        prop_assert!(!session.graph().unwrap().has_edge(&u, &v));
    }

    #[test]
    fn prop_missing_edge_removal_is_inert(edges in edge_list(), u in 0u8..12, v in 0u8..12) {
        let mut session = Session::new();
        session.load_str(&to_text(&edges)).unwrap();
        let (u, v) = (format!("n{u}"), format!("n{v}"));
        prop_assume!(!session.graph().unwrap().has_edge(&u, &v));

        let before = session.report();
        let removed = session.remove_edge(&u, &v);
        prop_assert!(matches!(removed, Err(EchoError::EdgeNotFound(_, _))));
        prop_assert_eq!(session.report(), before);
    }

    #[test]
    fn prop_edges_among_new_nodes_keep_bridges(edges in edge_list(), a in 0u8..5, b in 0u8..5) {
        let mut session = Session::new();
        session.load_str(&to_text(&edges)).unwrap();
        let before = session.result().unwrap().bridges.clone();

        session.add_edge(&format!("fresh{a}"), &format!("fresh{b}")).unwrap();
        prop_assert_eq!(&session.result().unwrap().bridges, &before);
        prop_assert_eq!(session.detections(), 1);
    }
}
