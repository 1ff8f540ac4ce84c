use crate::animation::sampler::EdgeMorph;
use crate::foundation::core::SnapshotId;
use crate::scene::proxy::ProxyHandle;

/// Nodes affected by one finished transition.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RevisionChanges {
    /// Nodes that rose.
    pub added: Vec<String>,
    /// Nodes whose attributes changed.
    pub changed: Vec<String>,
    /// Nodes that sank.
    pub removed: Vec<String>,
}

impl RevisionChanges {
    /// Whether the transition touched no node.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

/// State of the one running transition, owned by the renderer.
#[derive(Debug)]
pub struct AnimationSession {
    pub(crate) from: Option<SnapshotId>,
    pub(crate) to: SnapshotId,
    pub(crate) elapsed: f64,
    pub(crate) edge_duration: f64,
    pub(crate) morphs: Vec<(ProxyHandle, EdgeMorph)>,
    // Matched edges that could not be interpolated; snapped at completion.
    pub(crate) snapped: Vec<String>,
    // New edges, materialized at completion.
    pub(crate) fresh: Vec<String>,
    pub(crate) changes: RevisionChanges,
}

impl AnimationSession {
    pub(crate) fn new(from: Option<SnapshotId>, to: SnapshotId, edge_duration: f64) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            edge_duration,
            morphs: Vec::new(),
            snapped: Vec::new(),
            fresh: Vec::new(),
            changes: RevisionChanges::default(),
        }
    }

    /// Snapshot shown before the transition; `None` when displaying as new.
    pub fn from(&self) -> Option<SnapshotId> {
        self.from
    }

    /// Snapshot being shown.
    pub fn to(&self) -> SnapshotId {
        self.to
    }

    /// Seconds since the transition started.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Edge interpolation factor, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.edge_duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.edge_duration).min(1.0)
        }
    }

    /// Matched edge pairs being interpolated.
    pub fn morphs(&self) -> impl Iterator<Item = &EdgeMorph> {
        self.morphs.iter().map(|(_, m)| m)
    }

    /// Identities of matched edges that will be snapped at completion.
    pub fn snapped_edges(&self) -> &[String] {
        &self.snapped
    }

    /// Identities of new edges that will appear at completion.
    pub fn fresh_edges(&self) -> &[String] {
        &self.fresh
    }

    /// Node changes of this transition.
    pub fn changes(&self) -> &RevisionChanges {
        &self.changes
    }
}
