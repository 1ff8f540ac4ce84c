use crate::graph::model::{Edge, Node};
use crate::scene::proxy::{ProxyHandle, VisualFactory};
use std::collections::BTreeMap;

/// Identity to proxy bookkeeping for every node and edge currently materialized.
#[derive(Clone, Debug, Default)]
pub struct ObjectManager {
    nodes: BTreeMap<String, ProxyHandle>,
    edges: BTreeMap<String, ProxyHandle>,
}

impl ObjectManager {
    /// Manager without proxies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Proxy of `node`, creating it on first use. The flag reports whether it was created.
    pub fn get_or_create_node(
        &mut self,
        factory: &mut dyn VisualFactory,
        node: &Node,
    ) -> (ProxyHandle, bool) {
        if let Some(&h) = self.nodes.get(&node.id) {
            return (h, false);
        }
        let h = factory.create_node(node);
        self.nodes.insert(node.id.clone(), h);
        (h, true)
    }

    /// Proxy of `edge`, creating it on first use. The flag reports whether it was created.
    pub fn get_or_create_edge(
        &mut self,
        factory: &mut dyn VisualFactory,
        edge: &Edge,
    ) -> (ProxyHandle, bool) {
        if let Some(&h) = self.edges.get(&edge.id) {
            return (h, false);
        }
        let h = factory.create_edge(edge);
        self.edges.insert(edge.id.clone(), h);
        (h, true)
    }

    /// Proxy of node `id`.
    pub fn node(&self, id: &str) -> Option<ProxyHandle> {
        self.nodes.get(id).copied()
    }

    /// Proxy of edge `id`.
    pub fn edge(&self, id: &str) -> Option<ProxyHandle> {
        self.edges.get(id).copied()
    }

    /// Forget and destroy the proxy of node `id`.
    pub fn destroy_node(&mut self, factory: &mut dyn VisualFactory, id: &str) -> bool {
        match self.nodes.remove(id) {
            Some(h) => {
                factory.destroy(h);
                true
            }
            None => false,
        }
    }

    /// Forget and destroy the proxy of edge `id`.
    pub fn destroy_edge(&mut self, factory: &mut dyn VisualFactory, id: &str) -> bool {
        match self.edges.remove(id) {
            Some(h) => {
                factory.destroy(h);
                true
            }
            None => false,
        }
    }

    /// Identities of nodes with a proxy.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Identities of edges with a proxy.
    pub fn edge_ids(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Number of node proxies.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edge proxies.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Destroy every edge proxy.
    pub fn clear_edges(&mut self, factory: &mut dyn VisualFactory) {
        for (_, h) in std::mem::take(&mut self.edges) {
            factory.destroy(h);
        }
    }

    /// Destroy every proxy.
    pub fn clear(&mut self, factory: &mut dyn VisualFactory) {
        for (_, h) in std::mem::take(&mut self.nodes) {
            factory.destroy(h);
        }
        self.clear_edges(factory);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/objects.rs"]
mod tests;
