use crate::foundation::core::{NodeTransform, Vec3};
use crate::graph::model::{Edge, Node};
use crate::scene::proxy::{Marker, ProxyHandle, VisualFactory};
use std::collections::BTreeMap;

/// What a headless proxy stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyKind {
    /// Proxy of a graph node.
    Node,
    /// Proxy of a graph edge.
    Edge,
}

/// Recorded state of one live proxy.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyState {
    /// Node or edge.
    pub kind: ProxyKind,
    /// Identity of the graph element.
    pub id: String,
    /// Last transform set.
    pub transform: NodeTransform,
    /// Last line geometry set.
    pub line: Vec<Vec3>,
    /// Whether the proxy is shown.
    pub visible: bool,
    /// Current change marker.
    pub marker: Option<Marker>,
    /// Current style index.
    pub style: usize,
}

/// In-memory [`VisualFactory`] that records every proxy and mutation.
///
/// Useful for driving the engine without a renderer, e.g. from the command line or in tests.
#[derive(Clone, Debug, Default)]
pub struct HeadlessScene {
    next_handle: u64,
    live: BTreeMap<ProxyHandle, ProxyState>,
    created: usize,
    destroyed: usize,
    line_updates: usize,
}

impl HeadlessScene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn(&mut self, kind: ProxyKind, id: &str) -> ProxyHandle {
        let h = ProxyHandle(self.next_handle);
        self.next_handle += 1;
        self.created += 1;
        self.live.insert(
            h,
            ProxyState {
                kind,
                id: id.to_string(),
                transform: NodeTransform::default(),
                line: Vec::new(),
                visible: true,
                marker: None,
                style: 0,
            },
        );
        h
    }

    fn find(&self, kind: ProxyKind, id: &str) -> Option<&ProxyState> {
        self.live.values().find(|p| p.kind == kind && p.id == id)
    }

    /// State of a live proxy.
    pub fn get(&self, handle: ProxyHandle) -> Option<&ProxyState> {
        self.live.get(&handle)
    }

    /// Live proxy of node `id`.
    pub fn node(&self, id: &str) -> Option<&ProxyState> {
        self.find(ProxyKind::Node, id)
    }

    /// Live proxy of edge `id`.
    pub fn edge(&self, id: &str) -> Option<&ProxyState> {
        self.find(ProxyKind::Edge, id)
    }

    /// Identities of the visible node proxies, sorted.
    pub fn visible_nodes(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .live
            .values()
            .filter(|p| p.kind == ProxyKind::Node && p.visible)
            .map(|p| p.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Identities of the live edge proxies, sorted.
    pub fn edges(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .live
            .values()
            .filter(|p| p.kind == ProxyKind::Edge)
            .map(|p| p.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of live proxies.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Proxies created so far.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Proxies destroyed so far.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    /// Number of [`VisualFactory::set_line_geometry`] calls so far.
    pub fn line_updates(&self) -> usize {
        self.line_updates
    }
}

impl VisualFactory for HeadlessScene {
    fn create_node(&mut self, node: &Node) -> ProxyHandle {
        self.spawn(ProxyKind::Node, &node.id)
    }

    fn create_edge(&mut self, edge: &Edge) -> ProxyHandle {
        self.spawn(ProxyKind::Edge, &edge.id)
    }

    fn destroy(&mut self, handle: ProxyHandle) {
        if self.live.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn set_transform(&mut self, handle: ProxyHandle, transform: NodeTransform) {
        if let Some(p) = self.live.get_mut(&handle) {
            p.transform = transform;
        }
    }

    fn set_line_geometry(&mut self, handle: ProxyHandle, points: &[Vec3]) {
        if let Some(p) = self.live.get_mut(&handle) {
            p.line = points.to_vec();
            self.line_updates += 1;
        }
    }

    fn set_visible(&mut self, handle: ProxyHandle, visible: bool) {
        if let Some(p) = self.live.get_mut(&handle) {
            p.visible = visible;
        }
    }

    fn set_marker(&mut self, handle: ProxyHandle, marker: Option<Marker>) {
        if let Some(p) = self.live.get_mut(&handle) {
            p.marker = marker;
        }
    }

    fn set_style(&mut self, handle: ProxyHandle, style: usize) {
        if let Some(p) = self.live.get_mut(&handle) {
            p.style = style;
        }
    }
}
