use crate::foundation::core::SnapshotId;
use crate::foundation::error::{EvoError, EvoResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Named attribute values attached to a node or edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Floating point metrics.
    pub floats: BTreeMap<String, f64>,
    /// Integer metrics.
    pub ints: BTreeMap<String, i64>,
    /// String attributes.
    pub strings: BTreeMap<String, String>,
    /// Boolean attributes that are present when set.
    pub toggles: BTreeSet<String>,
}

impl Attributes {
    /// Numeric value of `name`, looking at floats first and then ints.
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.floats
            .get(name)
            .copied()
            .or_else(|| self.ints.get(name).map(|&v| v as f64))
    }

    /// Names of all numeric attributes.
    pub fn numeric_names(&self) -> impl Iterator<Item = &str> {
        self.floats
            .keys()
            .chain(self.ints.keys())
            .map(String::as_str)
    }
}

/// A node of one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identity that persists across revisions.
    pub id: String,
    /// Type tag.
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Identity of the parent node, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Node attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Node {
    /// Node without parent or attributes.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            parent: None,
            attributes: Attributes::default(),
        }
    }

    /// Builder-style parent assignment.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Builder-style float metric assignment.
    pub fn with_float(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.floats.insert(name.into(), value);
        self
    }
}

/// A directed edge of one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Identity that persists across revisions.
    pub id: String,
    /// Type tag.
    #[serde(rename = "type", default)]
    pub edge_type: String,
    /// Source node identity.
    pub source: String,
    /// Target node identity.
    pub target: String,
    /// Edge attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Edge {
    /// Edge without attributes.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            edge_type: String::new(),
            source: source.into(),
            target: target.into(),
            attributes: Attributes::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct GraphDef {
    #[serde(default)]
    name: String,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

/// One immutable revision of the graph series.
///
/// Construction validates the hierarchy and derives the child lists, so every query on a `Graph`
/// can assume unique identities and resolvable references.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "GraphDef", into = "GraphDef")]
pub struct Graph {
    name: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: BTreeMap<String, usize>,
    edge_index: BTreeMap<String, usize>,
    children: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
}

impl TryFrom<GraphDef> for Graph {
    type Error = EvoError;

    fn try_from(def: GraphDef) -> EvoResult<Self> {
        Self::new(def.name, def.nodes, def.edges)
    }
}

impl From<Graph> for GraphDef {
    fn from(g: Graph) -> Self {
        Self {
            name: g.name,
            nodes: g.nodes,
            edges: g.edges,
        }
    }
}

impl Graph {
    /// Build and validate a snapshot.
    pub fn new(name: impl Into<String>, nodes: Vec<Node>, edges: Vec<Edge>) -> EvoResult<Self> {
        let name = name.into();
        let mut node_index = BTreeMap::new();
        for (i, n) in nodes.iter().enumerate() {
            if n.id.is_empty() {
                return Err(EvoError::validation(format!(
                    "graph '{name}': node at position {i} has an empty id"
                )));
            }
            if node_index.insert(n.id.clone(), i).is_some() {
                return Err(EvoError::validation(format!(
                    "graph '{name}': duplicate node id '{}'",
                    n.id
                )));
            }
        }

        let mut children = vec![Vec::new(); nodes.len()];
        for (i, n) in nodes.iter().enumerate() {
            let Some(parent) = &n.parent else { continue };
            let Some(&p) = node_index.get(parent) else {
                return Err(EvoError::validation(format!(
                    "graph '{name}': node '{}' has unknown parent '{parent}'",
                    n.id
                )));
            };
            children[p].push(i);
        }

        // Walking up from any node must reach a root within `nodes.len()` steps.
        for (i, n) in nodes.iter().enumerate() {
            let mut cursor = n.parent.as_deref();
            let mut steps = 0usize;
            while let Some(p) = cursor {
                steps += 1;
                if steps > nodes.len() {
                    return Err(EvoError::validation(format!(
                        "graph '{name}': parent cycle through node '{}'",
                        nodes[i].id
                    )));
                }
                cursor = nodes[node_index[p]].parent.as_deref();
            }
        }

        let mut edge_index = BTreeMap::new();
        let mut outgoing = vec![Vec::new(); nodes.len()];
        for (i, e) in edges.iter().enumerate() {
            if edge_index.insert(e.id.clone(), i).is_some() {
                return Err(EvoError::validation(format!(
                    "graph '{name}': duplicate edge id '{}'",
                    e.id
                )));
            }
            let Some(&s) = node_index.get(&e.source) else {
                return Err(EvoError::validation(format!(
                    "graph '{name}': edge '{}' has unknown source '{}'",
                    e.id, e.source
                )));
            };
            if !node_index.contains_key(&e.target) {
                return Err(EvoError::validation(format!(
                    "graph '{name}': edge '{}' has unknown target '{}'",
                    e.id, e.target
                )));
            }
            outgoing[s].push(i);
        }

        Ok(Self {
            name,
            nodes,
            edges,
            node_index,
            edge_index,
            children,
            outgoing,
        })
    }

    /// Parse a snapshot from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> EvoResult<Self> {
        serde_json::from_reader(r).map_err(|e| EvoError::serde(format!("parse graph JSON: {e}")))
    }

    /// Parse a snapshot from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> EvoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EvoError::validation(format!("open graph JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Human-readable revision name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node with identity `id`.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Edge with identity `id`.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_index.get(id).map(|&i| &self.edges[i])
    }

    /// Whether a node with identity `id` exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Whether an edge with identity `id` exists.
    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    /// Direct children of `id` in declaration order. Empty for unknown ids.
    pub fn children(&self, id: &str) -> impl Iterator<Item = &Node> {
        self.node_index
            .get(id)
            .map(|&i| self.children[i].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&c| &self.nodes[c])
    }

    /// Whether `id` has no children. Unknown ids are not leaves.
    pub fn is_leaf(&self, id: &str) -> bool {
        self.node_index
            .get(id)
            .is_some_and(|&i| self.children[i].is_empty())
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.parent.is_none())
    }

    /// Edges leaving `id`.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.node_index
            .get(id)
            .map(|&i| self.outgoing[i].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&e| &self.edges[e])
    }

    /// Numeric attribute `attr` of node `id`.
    pub fn numeric(&self, id: &str, attr: &str) -> Option<f64> {
        self.node(id).and_then(|n| n.attributes.numeric(attr))
    }

    /// Whether `id` lies in the subtree rooted at `root` (inclusive).
    pub fn is_descendant_of(&self, id: &str, root: &str) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            if c == root {
                return true;
            }
            cursor = self.node(c).and_then(|n| n.parent.as_deref());
        }
        false
    }
}

/// Ordered list of immutable snapshots.
#[derive(Clone, Debug, Default)]
pub struct GraphSeries {
    snapshots: Vec<Arc<Graph>>,
}

impl GraphSeries {
    /// Series over the given snapshots, in order.
    pub fn new(snapshots: Vec<Graph>) -> Self {
        Self {
            snapshots: snapshots.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a series from a JSON array of snapshots.
    pub fn from_reader<R: std::io::Read>(r: R) -> EvoResult<Self> {
        let graphs: Vec<Graph> = serde_json::from_reader(r)
            .map_err(|e| EvoError::serde(format!("parse graph series JSON: {e}")))?;
        Ok(Self::new(graphs))
    }

    /// Parse a series from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> EvoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EvoError::validation(format!("open graph series JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the series has no snapshots.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot at `id`.
    pub fn get(&self, id: SnapshotId) -> Option<&Arc<Graph>> {
        self.snapshots.get(id.0)
    }

    /// Snapshots paired with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (SnapshotId, &Arc<Graph>)> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(i, g)| (SnapshotId(i), g))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/model.rs"]
mod tests;
