use crate::animation::ease::Ease;
use crate::diff::graph_diff::Difference;
use crate::foundation::core::NodeTransform;
use crate::scene::proxy::{Marker, ProxyHandle, VisualFactory};

/// Continuation the owner of a [`NodeAnimator`] runs when a tween completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnComplete {
    /// Leave the proxy in place.
    Keep,
    /// Destroy the proxy.
    Destroy,
}

/// A completed tween, reported by [`NodeAnimator::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedTween {
    /// Graph-node identity.
    pub node_id: String,
    /// Proxy the tween moved.
    pub handle: ProxyHandle,
    /// Classification the tween animated.
    pub difference: Difference,
    /// Continuation the owner runs.
    pub on_complete: OnComplete,
}

#[derive(Clone, Debug)]
struct Tween {
    node_id: String,
    handle: ProxyHandle,
    from: NodeTransform,
    to: NodeTransform,
    difference: Difference,
    duration: f64,
    elapsed: f64,
    on_complete: OnComplete,
}

/// Drives bounded-duration move/scale tweens of node proxies.
///
/// The flavour of a tween follows its [`Difference`]: added nodes rise out of the ground,
/// changed nodes shake about the vertical axis and carry a marker, deleted nodes sink below the
/// ground, unchanged nodes only move and scale.
#[derive(Clone, Debug)]
pub struct NodeAnimator {
    ease: Ease,
    shake_degrees: f64,
    tweens: Vec<Tween>,
}

impl Default for NodeAnimator {
    fn default() -> Self {
        Self::new(Ease::default())
    }
}

impl NodeAnimator {
    /// Animator easing every tween with `ease`.
    pub fn new(ease: Ease) -> Self {
        Self {
            ease,
            shake_degrees: 10.0,
            tweens: Vec::new(),
        }
    }

    /// Start a tween of `handle` towards `to`.
    ///
    /// `from` is the proxy's current state; added nodes ignore it and start below `to`, deleted
    /// nodes ignore `to` and end below `from`. A tween already running on `handle` is replaced.
    #[allow(clippy::too_many_arguments)]
    pub fn animate_to(
        &mut self,
        factory: &mut dyn VisualFactory,
        node_id: &str,
        handle: ProxyHandle,
        from: NodeTransform,
        to: NodeTransform,
        difference: Difference,
        duration: f64,
        on_complete: OnComplete,
    ) {
        let (from, to, marker) = match difference {
            Difference::Added => (to.below_ground(), to, Some(Marker::Born)),
            Difference::Changed => (from, to, Some(Marker::Changed)),
            Difference::Deleted => (from, from.below_ground(), Some(Marker::Dead)),
            Difference::None => (from, to, None),
        };
        factory.set_visible(handle, true);
        factory.set_marker(handle, marker);
        factory.set_transform(handle, from);

        self.tweens.retain(|t| t.handle != handle);
        self.tweens.push(Tween {
            node_id: node_id.to_string(),
            handle,
            from,
            to,
            difference,
            duration: duration.max(0.0),
            elapsed: 0.0,
            on_complete,
        });
    }

    /// Advance every tween by `dt` seconds and return the ones that completed.
    pub fn tick(&mut self, dt: f64, factory: &mut dyn VisualFactory) -> Vec<FinishedTween> {
        let mut finished = Vec::new();
        let shake = self.shake_degrees;
        let ease = self.ease;
        self.tweens.retain_mut(|t| {
            t.elapsed += dt.max(0.0);
            if t.elapsed >= t.duration {
                factory.set_transform(t.handle, t.to);
                finished.push(FinishedTween {
                    node_id: std::mem::take(&mut t.node_id),
                    handle: t.handle,
                    difference: t.difference,
                    on_complete: t.on_complete,
                });
                return false;
            }
            let p = t.elapsed / t.duration;
            let mut state = t.from.lerp(t.to, ease.apply(p));
            if t.difference == Difference::Changed {
                state.rotation += shake * (p * std::f64::consts::TAU * 2.0).sin() * (1.0 - p);
            }
            factory.set_transform(t.handle, state);
            true
        });
        finished
    }

    /// Whether no tween is running.
    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Number of running tweens.
    pub fn active(&self) -> usize {
        self.tweens.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
