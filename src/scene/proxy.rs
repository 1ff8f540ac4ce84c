use crate::foundation::core::{NodeTransform, Vec3};
use crate::graph::model::{Edge, Node};

/// Opaque handle to a visual proxy owned by a [`VisualFactory`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ProxyHandle(pub u64);

/// Transient highlight attached to a node proxy during a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Marker {
    /// Node appeared in this revision.
    Born,
    /// Node attributes changed in this revision.
    Changed,
    /// Node disappears in this revision.
    Dead,
}

/// Creates and mutates the visual proxies of nodes and edges.
///
/// The engine only ever talks to the scene through this trait; mesh and material concerns stay
/// with the implementor.
pub trait VisualFactory {
    /// Create a proxy for `node`.
    fn create_node(&mut self, node: &Node) -> ProxyHandle;

    /// Create a proxy for `edge`.
    fn create_edge(&mut self, edge: &Edge) -> ProxyHandle;

    /// Destroy a proxy. Unknown handles are ignored.
    fn destroy(&mut self, handle: ProxyHandle);

    /// Set the spatial state of a node proxy.
    fn set_transform(&mut self, handle: ProxyHandle, transform: NodeTransform);

    /// Replace the polyline of an edge proxy.
    fn set_line_geometry(&mut self, handle: ProxyHandle, points: &[Vec3]);

    /// Show or hide a proxy. Proxies are visible when created.
    fn set_visible(&mut self, _handle: ProxyHandle, _visible: bool) {}

    /// Attach or clear a highlight marker.
    fn set_marker(&mut self, _handle: ProxyHandle, _marker: Option<Marker>) {}

    /// Select the discrete style (colour ramp entry) of a node proxy.
    fn set_style(&mut self, _handle: ProxyHandle, _style: usize) {}
}
