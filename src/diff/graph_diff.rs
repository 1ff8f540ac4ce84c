use crate::graph::model::{Attributes, Graph};
use std::collections::{BTreeMap, BTreeSet};

/// Classification of a node between a current and a next snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Difference {
    /// Present in both with equal compared attributes.
    None,
    /// Present only in the next snapshot.
    Added,
    /// Present in both with differing compared attributes.
    Changed,
    /// Present only in the current snapshot.
    Deleted,
}

/// Attribute comparison used to tell [`Difference::Changed`] from [`Difference::None`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeDiff {
    attributes: Vec<String>,
}

fn same_float(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y || (x.is_nan() && y.is_nan()),
        (None, None) => true,
        _ => false,
    }
}

impl AttributeDiff {
    /// Compare the named attributes (float, int, string and toggle values).
    ///
    /// An empty list compares every numeric attribute.
    pub fn new(attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Compare every numeric attribute.
    pub fn all_numeric() -> Self {
        Self::default()
    }

    /// Whether `a` and `b` differ in any compared attribute.
    pub fn differs(&self, a: &Attributes, b: &Attributes) -> bool {
        if self.attributes.is_empty() {
            let names: BTreeSet<&str> = a.numeric_names().chain(b.numeric_names()).collect();
            return names
                .into_iter()
                .any(|n| !same_float(a.numeric(n), b.numeric(n)));
        }
        self.attributes.iter().any(|n| {
            let n = n.as_str();
            !same_float(a.floats.get(n).copied(), b.floats.get(n).copied())
                || a.ints.get(n) != b.ints.get(n)
                || a.strings.get(n) != b.strings.get(n)
                || a.toggles.contains(n) != b.toggles.contains(n)
        })
    }
}

/// Node and edge changes from a current snapshot to a next one, by identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphDiff {
    nodes: BTreeMap<String, Difference>,
    removed_nodes: BTreeSet<String>,
    added_edges: BTreeSet<String>,
    removed_edges: BTreeSet<String>,
    kept_edges: BTreeSet<String>,
}

impl GraphDiff {
    /// Diff `current` against `next`. Without a current snapshot every element of `next` is new.
    pub fn compute(current: Option<&Graph>, next: &Graph, attrs: &AttributeDiff) -> Self {
        let mut out = Self::default();
        for node in next.nodes() {
            let d = match current.and_then(|c| c.node(&node.id)) {
                None => Difference::Added,
                Some(old) if attrs.differs(&old.attributes, &node.attributes) => {
                    Difference::Changed
                }
                Some(_) => Difference::None,
            };
            out.nodes.insert(node.id.clone(), d);
        }
        for edge in next.edges() {
            if current.is_some_and(|c| c.contains_edge(&edge.id)) {
                out.kept_edges.insert(edge.id.clone());
            } else {
                out.added_edges.insert(edge.id.clone());
            }
        }
        if let Some(c) = current {
            out.removed_nodes = c
                .nodes()
                .iter()
                .filter(|n| !next.contains_node(&n.id))
                .map(|n| n.id.clone())
                .collect();
            out.removed_edges = c
                .edges()
                .iter()
                .filter(|e| !next.contains_edge(&e.id))
                .map(|e| e.id.clone())
                .collect();
        }
        out
    }

    /// Classification of node `id`; removed nodes report [`Difference::Deleted`].
    pub fn difference(&self, id: &str) -> Option<Difference> {
        if self.removed_nodes.contains(id) {
            return Some(Difference::Deleted);
        }
        self.nodes.get(id).copied()
    }

    /// Every node of the next snapshot with its classification.
    pub fn node_differences(&self) -> impl Iterator<Item = (&str, Difference)> {
        self.nodes.iter().map(|(k, d)| (k.as_str(), *d))
    }

    fn with(&self, d: Difference) -> impl Iterator<Item = &str> {
        self.node_differences()
            .filter(move |(_, x)| *x == d)
            .map(|(k, _)| k)
    }

    /// Nodes only present in the next snapshot.
    pub fn added_nodes(&self) -> impl Iterator<Item = &str> {
        self.with(Difference::Added)
    }

    /// Nodes whose compared attributes differ.
    pub fn changed_nodes(&self) -> impl Iterator<Item = &str> {
        self.with(Difference::Changed)
    }

    /// Nodes present in both snapshots without differences.
    pub fn unchanged_nodes(&self) -> impl Iterator<Item = &str> {
        self.with(Difference::None)
    }

    /// Nodes only present in the current snapshot.
    pub fn removed_nodes(&self) -> &BTreeSet<String> {
        &self.removed_nodes
    }

    /// Edges only present in the next snapshot.
    pub fn added_edges(&self) -> &BTreeSet<String> {
        &self.added_edges
    }

    /// Edges only present in the current snapshot.
    pub fn removed_edges(&self) -> &BTreeSet<String> {
        &self.removed_edges
    }

    /// Edges present in both snapshots.
    pub fn kept_edges(&self) -> &BTreeSet<String> {
        &self.kept_edges
    }
}

/// Old and new edge visuals paired by edge identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeMatch<O, N> {
    /// Present on both sides.
    pub matched: Vec<(String, O, N)>,
    /// Only on the old side.
    pub stale: Vec<(String, O)>,
    /// Only on the new side.
    pub fresh: Vec<(String, N)>,
}

/// Pair old and new edge visuals solely by edge identity. Output is ordered by identity.
pub fn match_edges<'a, O, N>(
    old: impl IntoIterator<Item = (&'a str, O)>,
    new: impl IntoIterator<Item = (&'a str, N)>,
) -> EdgeMatch<O, N> {
    let mut old: BTreeMap<&str, O> = old.into_iter().collect();
    let mut out = EdgeMatch {
        matched: Vec::new(),
        stale: Vec::new(),
        fresh: Vec::new(),
    };
    let new: BTreeMap<&str, N> = new.into_iter().collect();
    for (id, n) in new {
        match old.remove(id) {
            Some(o) => out.matched.push((id.to_string(), o, n)),
            None => out.fresh.push((id.to_string(), n)),
        }
    }
    out.stale = old.into_iter().map(|(k, o)| (k.to_string(), o)).collect();
    out
}

#[cfg(test)]
#[path = "../../tests/unit/diff/graph_diff.rs"]
mod tests;
