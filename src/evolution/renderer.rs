use crate::animation::animator::{NodeAnimator, OnComplete};
use crate::animation::deferred::DeferredQueue;
use crate::animation::sampler::{
    EdgeMorph, PerformanceScore, SamplingPolicy, curve_length, sample_curve,
};
use crate::config::EvolutionSettings;
use crate::diff::graph_diff::{AttributeDiff, Difference, GraphDiff, match_edges};
use crate::evolution::session::{AnimationSession, RevisionChanges};
use crate::foundation::core::{NodeTransform, SnapshotId, Vec3};
use crate::foundation::error::{EvoError, EvoResult};
use crate::graph::model::GraphSeries;
use crate::layout::cache::{LaidOutGraph, LayoutCache};
use crate::layout::edges::EdgePath;
use crate::layout::pipeline::LayoutPipeline;
use crate::layout::strategy::LayoutRegistry;
use crate::scene::objects::ObjectManager;
use crate::scene::proxy::{ProxyHandle, VisualFactory};
use std::collections::BTreeMap;

/// Why a control-surface request was refused. Refusals never change state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RejectReason {
    /// [`EvolutionRenderer::precompute`] has not run yet.
    NotPrecomputed,
    /// A transition is running.
    Transitioning,
    /// Auto-play is on; manual stepping is disabled.
    AutoPlayActive,
    /// No snapshot at this index.
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of snapshots.
        len: usize,
    },
    /// Stepping needs a shown snapshot.
    NothingShown,
    /// Already at the last snapshot.
    AtLastGraph,
    /// Already at the first snapshot.
    AtFirstGraph,
    /// Negative or non-finite duration.
    InvalidDuration,
}

/// Outcome of a control-surface request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Request {
    /// The request was carried out.
    Accepted,
    /// The request was refused; nothing changed.
    Rejected(RejectReason),
}

impl Request {
    /// Whether the request was carried out.
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// Notifications for the host, drained with [`EvolutionRenderer::take_events`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum EvolutionEvent {
    /// A transition began; `from` is `None` when a snapshot is displayed as new.
    TransitionStarted {
        /// Snapshot being left.
        from: Option<SnapshotId>,
        /// Snapshot being shown.
        to: SnapshotId,
    },
    /// The scene now fully shows `index`.
    TransitionFinished {
        /// Snapshot now shown.
        index: SnapshotId,
        /// Nodes added, changed and removed by the transition.
        changes: RevisionChanges,
    },
    /// The shown snapshot changed.
    ShownGraphChanged {
        /// Snapshot now shown.
        index: SnapshotId,
    },
    /// Auto-play was switched on or off.
    AutoPlayChanged {
        /// Whether auto-play is now on.
        enabled: bool,
        /// Whether it walks the series backwards.
        reverse: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    Finish,
    AutoAdvance,
}

/// Step direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Forward,
    Backward,
}

/// Plays a precomputed graph series as animated transitions between snapshots.
///
/// Single-threaded and tick driven: the host calls [`EvolutionRenderer::tick`] once per frame.
/// At most one transition runs at a time; requests made meanwhile are rejected.
pub struct EvolutionRenderer<F: VisualFactory> {
    settings: EvolutionSettings,
    registry: LayoutRegistry,
    attrs: AttributeDiff,
    factory: F,
    objects: ObjectManager,
    cache: Option<LayoutCache>,
    animator: NodeAnimator,
    deferred: DeferredQueue<Deferred>,
    session: Option<AnimationSession>,
    current: Option<SnapshotId>,
    auto_play: Option<Step>,
    score: PerformanceScore,
    last_edge_count: usize,
    displayed: BTreeMap<String, Vec<Vec3>>,
    last_changes: Option<RevisionChanges>,
    events: Vec<EvolutionEvent>,
}

impl<F: VisualFactory> EvolutionRenderer<F> {
    /// Renderer with the built-in layouts.
    pub fn new(settings: EvolutionSettings, factory: F) -> EvoResult<Self> {
        Self::with_registry(settings, LayoutRegistry::default(), factory)
    }

    /// Renderer resolving layout names through `registry`.
    pub fn with_registry(
        settings: EvolutionSettings,
        registry: LayoutRegistry,
        factory: F,
    ) -> EvoResult<Self> {
        settings.validate(&registry)?;
        Ok(Self {
            attrs: AttributeDiff::new(settings.diff_attributes.iter().cloned()),
            animator: NodeAnimator::new(settings.animation.ease),
            score: PerformanceScore::new(settings.animation.sampling.initial_score),
            settings,
            registry,
            factory,
            objects: ObjectManager::new(),
            cache: None,
            deferred: DeferredQueue::new(),
            session: None,
            current: None,
            auto_play: None,
            last_edge_count: 0,
            displayed: BTreeMap::new(),
            last_changes: None,
            events: Vec::new(),
        })
    }

    /// Lay out every snapshot of `series` and reset playback. Nothing is shown afterwards.
    ///
    /// On failure the previous cache is dropped and the renderer stays unprecomputed.
    #[tracing::instrument(skip_all, fields(snapshots = series.len()))]
    pub fn precompute(&mut self, series: &GraphSeries) -> EvoResult<()> {
        if self.session.is_some() {
            return Err(EvoError::validation(
                "cannot precompute while a transition is running",
            ));
        }
        self.objects.clear(&mut self.factory);
        self.cache = None;
        self.current = None;
        self.auto_play = None;
        self.displayed.clear();
        self.deferred.clear();
        self.last_edge_count = 0;
        self.last_changes = None;

        let pipeline = LayoutPipeline::for_series(&self.registry, &self.settings, series)?;
        let cache = LayoutCache::precompute(series, &pipeline, &mut self.objects, &mut self.factory)?;
        tracing::info!(snapshots = cache.len(), "series precomputed");
        self.cache = Some(cache);
        Ok(())
    }

    fn check_idle(&self) -> Result<usize, RejectReason> {
        let Some(cache) = &self.cache else {
            return Err(RejectReason::NotPrecomputed);
        };
        if self.session.is_some() {
            return Err(RejectReason::Transitioning);
        }
        Ok(cache.len())
    }

    fn reject(&self, what: &str, reason: RejectReason) -> Request {
        tracing::info!(request = what, ?reason, "request rejected");
        Request::Rejected(reason)
    }

    /// Display the first snapshot as new.
    pub fn show_first(&mut self) -> Request {
        self.show_index(0)
    }

    /// Display snapshot `index` as new: the scene is cleared and every node rises.
    pub fn show_index(&mut self, index: usize) -> Request {
        let len = match self.check_idle() {
            Ok(len) => len,
            Err(r) => return self.reject("show_index", r),
        };
        if self.auto_play.is_some() {
            return self.reject("show_index", RejectReason::AutoPlayActive);
        }
        if index >= len {
            return self.reject("show_index", RejectReason::IndexOutOfRange { index, len });
        }
        self.start_transition(None, SnapshotId(index))
    }

    /// Transition to the next snapshot.
    pub fn show_next(&mut self) -> Request {
        self.manual_step(Step::Forward, "show_next")
    }

    /// Transition to the previous snapshot.
    pub fn show_previous(&mut self) -> Request {
        self.manual_step(Step::Backward, "show_previous")
    }

    fn manual_step(&mut self, step: Step, what: &str) -> Request {
        if let Err(r) = self.check_idle() {
            return self.reject(what, r);
        }
        if self.auto_play.is_some() {
            return self.reject(what, RejectReason::AutoPlayActive);
        }
        self.step(step, what)
    }

    fn step(&mut self, step: Step, what: &str) -> Request {
        let len = match self.check_idle() {
            Ok(len) => len,
            Err(r) => return self.reject(what, r),
        };
        let Some(current) = self.current else {
            return self.reject(what, RejectReason::NothingShown);
        };
        let target = match step {
            Step::Forward if current.0 + 1 < len => current.0 + 1,
            Step::Forward => return self.reject(what, RejectReason::AtLastGraph),
            Step::Backward if current.0 > 0 => current.0 - 1,
            Step::Backward => return self.reject(what, RejectReason::AtFirstGraph),
        };
        self.start_transition(Some(current), SnapshotId(target))
    }

    /// Switch forward auto-play on or off.
    pub fn set_auto_play(&mut self, enabled: bool) -> Request {
        self.set_auto(Step::Forward, enabled)
    }

    /// Switch reverse auto-play on or off.
    pub fn set_auto_play_reverse(&mut self, enabled: bool) -> Request {
        self.set_auto(Step::Backward, enabled)
    }

    fn set_auto(&mut self, direction: Step, enabled: bool) -> Request {
        if !enabled {
            if self.auto_play == Some(direction) {
                self.switch_auto_play(None);
            }
            return Request::Accepted;
        }
        if self.cache.is_none() {
            return self.reject("set_auto_play", RejectReason::NotPrecomputed);
        }
        if self.current.is_none() && self.session.is_none() {
            return self.reject("set_auto_play", RejectReason::NothingShown);
        }
        self.switch_auto_play(Some(direction));
        if self.session.is_some() {
            // Continues when the running transition finishes.
            return Request::Accepted;
        }
        match self.step(direction, "set_auto_play") {
            Request::Accepted => Request::Accepted,
            rejected => {
                self.switch_auto_play(None);
                rejected
            }
        }
    }

    fn switch_auto_play(&mut self, mode: Option<Step>) {
        if self.auto_play == mode {
            return;
        }
        self.auto_play = mode;
        self.events.push(EvolutionEvent::AutoPlayChanged {
            enabled: mode.is_some(),
            reverse: mode == Some(Step::Backward),
        });
    }

    /// Set the duration of subsequent transitions.
    pub fn set_animation_duration(&mut self, seconds: f64) -> Request {
        if !seconds.is_finite() || seconds < 0.0 {
            return self.reject("set_animation_duration", RejectReason::InvalidDuration);
        }
        self.settings.animation.duration_secs = seconds;
        Request::Accepted
    }

    fn sample_count(&self, path: &EdgePath, current_edges: usize) -> usize {
        self.settings.animation.sampling.sample_count(
            curve_length(&path.control_points),
            self.score.value(),
            self.last_edge_count,
            current_edges,
        )
    }

    fn start_transition(&mut self, from: Option<SnapshotId>, to: SnapshotId) -> Request {
        let Some(cache) = self.cache.as_ref() else {
            return self.reject("transition", RejectReason::NotPrecomputed);
        };
        let Some(next) = cache.try_get(to) else {
            let len = cache.len();
            return self.reject(
                "transition",
                RejectReason::IndexOutOfRange { index: to.0, len },
            );
        };
        let current = from.and_then(|f| cache.try_get(f));
        let anim = self.settings.animation.clone();
        let mut session = AnimationSession::new(from, to, anim.transition_time());

        let factory = &mut self.factory;
        let objects = &mut self.objects;
        let animator = &mut self.animator;

        // Markers of the previous transition.
        let live: Vec<ProxyHandle> = objects.node_ids().filter_map(|id| objects.node(id)).collect();
        for h in live {
            factory.set_marker(h, None);
            if current.is_none() {
                factory.set_visible(h, false);
            }
        }
        if current.is_none() {
            objects.clear_edges(factory);
            self.displayed.clear();
        }

        let diff = GraphDiff::compute(
            current.map(|c| c.graph().as_ref()),
            next.graph(),
            &self.attrs,
        );

        // Removals first.
        if let Some(cur) = current {
            for id in cur.node_ids() {
                if next.contains_node(id) {
                    continue;
                }
                let (Some(h), Some(t)) = (objects.node(id), cur.transform(id)) else {
                    continue;
                };
                animator.animate_to(
                    factory,
                    id,
                    h,
                    t,
                    t,
                    Difference::Deleted,
                    anim.removal_duration(),
                    OnComplete::Destroy,
                );
                session.changes.removed.push(id.to_string());
            }
        }

        // Then additions and updates towards the target layout.
        for id in next.node_ids() {
            let Some(node) = next.graph().node(id) else {
                continue;
            };
            let Some(to_t) = next.transform(id) else {
                continue;
            };
            let (h, _) = objects.get_or_create_node(factory, node);
            if let Some(style) = next.style(id) {
                factory.set_style(h, style);
            }
            let shown_before = current.and_then(|c| c.transform(id));
            let difference = match shown_before {
                None => Difference::Added,
                Some(_) => diff.difference(id).unwrap_or(Difference::None),
            };
            match difference {
                Difference::Added => session.changes.added.push(id.to_string()),
                Difference::Changed => session.changes.changed.push(id.to_string()),
                _ => {}
            }
            animator.animate_to(
                factory,
                id,
                h,
                shown_before.unwrap_or_else(NodeTransform::default),
                to_t,
                difference,
                anim.duration_secs,
                OnComplete::Keep,
            );
        }

        // Edges last, from the target geometry.
        let old: Vec<(String, ProxyHandle)> = objects
            .edge_ids()
            .filter_map(|id| objects.edge(id).map(|h| (id.to_string(), h)))
            .collect();
        let m = match_edges(
            old.iter().map(|(id, h)| (id.as_str(), *h)),
            next.edge_paths().map(|p| (p.edge_id.as_str(), p)),
        );
        for (id, _) in &m.stale {
            objects.destroy_edge(factory, id);
            self.displayed.remove(id);
        }
        let matched = m.matched.len();
        self.score.begin_transition();
        let policy = anim.sampling;
        let score = self.score.value();
        for (id, h, path) in m.matched {
            let n = policy.sample_count(
                curve_length(&path.control_points),
                score,
                self.last_edge_count,
                matched,
            );
            let morph = match self.displayed.get(&id) {
                Some(line) => EdgeMorph::new(id.clone(), line, &path.control_points, n),
                None => Err(EvoError::geometry("edge has no displayed geometry")),
            };
            match morph {
                Ok(morph) => {
                    factory.set_line_geometry(h, morph.current());
                    session.morphs.push((h, morph));
                }
                Err(e) => {
                    tracing::warn!(edge = %id, error = %e, "edge pair skipped, snapping at completion");
                    session.snapped.push(id);
                }
            }
        }
        session.fresh = m.fresh.into_iter().map(|(id, _)| id).collect();
        self.last_edge_count = matched;

        tracing::debug!(
            from = ?from.map(|s| s.0),
            to = to.0,
            added = session.changes.added.len(),
            changed = session.changes.changed.len(),
            removed = session.changes.removed.len(),
            morphs = session.morphs.len(),
            "transition started"
        );
        self.session = Some(session);
        self.deferred.schedule(anim.transition_time(), Deferred::Finish);
        self.events.push(EvolutionEvent::TransitionStarted { from, to });
        Request::Accepted
    }

    /// Advance playback by `delta` seconds of wall-clock time.
    pub fn tick(&mut self, delta: f64) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };

        for done in self.animator.tick(delta, &mut self.factory) {
            if done.on_complete == OnComplete::Destroy {
                self.objects.destroy_node(&mut self.factory, &done.node_id);
            }
        }

        if let Some(session) = self.session.as_mut() {
            session.elapsed += delta;
            let policy = &self.settings.animation.sampling;
            if self.score.record_frame(delta, policy) {
                tracing::warn!(
                    score = self.score.value(),
                    pairs = session.morphs.len(),
                    "frame budget exceeded, halving edge resolution"
                );
                let mut kept = Vec::with_capacity(session.morphs.len());
                for (h, mut morph) in std::mem::take(&mut session.morphs) {
                    match morph.halve() {
                        Ok(()) => kept.push((h, morph)),
                        Err(_) => session.snapped.push(morph.edge_id().to_string()),
                    }
                }
                session.morphs = kept;
            }
            let t = session.progress();
            for (h, morph) in &mut session.morphs {
                let points = morph.interpolate(t);
                self.factory.set_line_geometry(*h, points);
            }
        }

        for task in self.deferred.advance(delta) {
            match task {
                Deferred::Finish if self.animator.is_idle() => self.finish_transition(),
                Deferred::Finish => self.deferred.schedule(0.0, Deferred::Finish),
                Deferred::AutoAdvance => self.auto_advance(),
            }
        }
    }

    fn materialize_edge(&mut self, next: &LaidOutGraph, id: &str, current_edges: usize) {
        let (Some(path), Some(edge)) = (next.edge_path(id), next.graph().edge(id)) else {
            return;
        };
        let n = self.sample_count(path, current_edges);
        let line = sample_curve(&path.control_points, n).unwrap_or_else(|e| {
            tracing::warn!(edge = %id, error = %e, "edge drawn through its control points");
            path.control_points.clone()
        });
        let (h, _) = self.objects.get_or_create_edge(&mut self.factory, edge);
        self.factory.set_line_geometry(h, &line);
        self.displayed.insert(id.to_string(), line);
    }

    fn finish_transition(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let cache = self.cache.take();
        if let Some(next) = cache.as_ref().and_then(|c| c.try_get(session.to)) {
            for (h, morph) in &session.morphs {
                self.factory.set_line_geometry(*h, morph.target());
                self.displayed
                    .insert(morph.edge_id().to_string(), morph.target().to_vec());
            }
            let total = next.edge_paths().count();
            for id in session.snapped.iter().chain(&session.fresh) {
                self.materialize_edge(next, id, total);
            }
        }
        self.cache = cache;

        let index = session.to;
        self.current = Some(index);
        tracing::info!(
            index = index.0,
            added = session.changes.added.len(),
            changed = session.changes.changed.len(),
            removed = session.changes.removed.len(),
            "transition finished"
        );
        self.last_changes = Some(session.changes.clone());
        self.events.push(EvolutionEvent::ShownGraphChanged { index });
        self.events.push(EvolutionEvent::TransitionFinished {
            index,
            changes: session.changes,
        });
        if self.auto_play.is_some() {
            self.deferred.schedule(0.0, Deferred::AutoAdvance);
        }
    }

    fn auto_advance(&mut self) {
        let Some(direction) = self.auto_play else {
            return;
        };
        if !self.step(direction, "auto_play").is_accepted() {
            self.switch_auto_play(None);
        }
    }

    /// Drain pending events, oldest first.
    pub fn take_events(&mut self) -> Vec<EvolutionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot currently shown; during a transition, the one being left.
    pub fn current_index(&self) -> Option<SnapshotId> {
        self.current
    }

    /// Whether a transition is running.
    pub fn is_animating(&self) -> bool {
        self.session.is_some()
    }

    /// Number of precomputed snapshots.
    pub fn graph_count(&self) -> usize {
        self.cache.as_ref().map_or(0, LayoutCache::len)
    }

    /// Whether forward auto-play is on.
    pub fn is_auto_play(&self) -> bool {
        self.auto_play == Some(Step::Forward)
    }

    /// Whether reverse auto-play is on.
    pub fn is_auto_play_reverse(&self) -> bool {
        self.auto_play == Some(Step::Backward)
    }

    /// Duration applied to the next transition, in seconds.
    pub fn animation_duration(&self) -> f64 {
        self.settings.animation.duration_secs
    }

    /// Current performance score of the edge sampler.
    pub fn performance_score(&self) -> i32 {
        self.score.value()
    }

    /// Active edge-sampling policy.
    pub fn sampling_policy(&self) -> &SamplingPolicy {
        &self.settings.animation.sampling
    }

    /// Running transition, if any.
    pub fn session(&self) -> Option<&AnimationSession> {
        self.session.as_ref()
    }

    /// Changes published by the last finished transition.
    pub fn last_changes(&self) -> Option<&RevisionChanges> {
        self.last_changes.as_ref()
    }

    /// Laid-out series, once precomputed.
    pub fn cache(&self) -> Option<&LayoutCache> {
        self.cache.as_ref()
    }

    /// Current settings.
    pub fn settings(&self) -> &EvolutionSettings {
        &self.settings
    }

    /// The visual factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Mutable access to the visual factory.
    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }
}

#[cfg(test)]
#[path = "../../tests/unit/evolution/renderer.rs"]
mod tests;
