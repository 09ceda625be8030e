use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub type CommunityId = usize;

/// Node to community assignment.
///
/// A node missing from the partition is unassigned; metric code skips it
/// instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Partition {
    assignments: HashMap<String, CommunityId>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a partition from raw labels, renumbering them to consecutive
    /// ids in order of first appearance.
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let mut renumber: HashMap<usize, CommunityId> = HashMap::new();
        let assignments = labels
            .into_iter()
            .map(|(node, label)| {
                let next = renumber.len();
                let id = *renumber.entry(label).or_insert(next);
                (node.to_string(), id)
            })
            .collect();
        Partition { assignments }
    }

    pub fn get(&self, node: &str) -> Option<CommunityId> {
        self.assignments.get(node).copied()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.assignments.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn community_count(&self) -> usize {
        self.members().len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CommunityId)> + '_ {
        self.assignments.iter().map(|(n, &c)| (n.as_str(), c))
    }

    /// Members of each community, sorted by name.
    pub fn members(&self) -> BTreeMap<CommunityId, Vec<String>> {
        let mut members: BTreeMap<CommunityId, Vec<String>> = BTreeMap::new();
        for (node, &id) in &self.assignments {
            members.entry(id).or_default().push(node.clone());
        }
        for nodes in members.values_mut() {
            nodes.sort();
        }
        members
    }
}

impl<S: Into<String>> FromIterator<(S, CommunityId)> for Partition {
    fn from_iter<T: IntoIterator<Item = (S, CommunityId)>>(iter: T) -> Self {
        Partition {
            assignments: iter.into_iter().map(|(n, c)| (n.into(), c)).collect(),
        }
    }
}
