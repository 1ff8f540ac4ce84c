//! Curve sampling and the frame-time feedback loop that bounds edge-curve resolution.

use crate::foundation::core::Vec3;
use crate::foundation::error::{EvoError, EvoResult};

/// Hard bounds every sample count is clamped into.
pub const SAMPLE_BOUNDS: (usize, usize) = (2, 75);

fn check_finite(points: &[Vec3]) -> EvoResult<()> {
    if points.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(EvoError::geometry("curve has non-finite control points"))
    }
}

/// Length of the polyline through `points`.
pub fn curve_length(points: &[Vec3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Evaluate the Bézier curve with the given control polygon at `n` evenly spaced parameters.
///
/// Two control points give a straight segment.
pub fn sample_curve(control: &[Vec3], n: usize) -> EvoResult<Vec<Vec3>> {
    if control.is_empty() {
        return Err(EvoError::geometry("curve has no control points"));
    }
    if n < 2 {
        return Err(EvoError::geometry(format!("cannot sample a curve with {n} points")));
    }
    check_finite(control)?;

    let mut scratch = Vec::with_capacity(control.len());
    let out = (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            // de Casteljau
            scratch.clear();
            scratch.extend_from_slice(control);
            for k in (1..scratch.len()).rev() {
                for j in 0..k {
                    scratch[j] = scratch[j].lerp(scratch[j + 1], t);
                }
            }
            scratch[0]
        })
        .collect();
    Ok(out)
}

/// Resample a polyline to `n` points spaced evenly along its arc length.
///
/// Fails for polylines with fewer than two points or zero length.
pub fn resample_polyline(points: &[Vec3], n: usize) -> EvoResult<Vec<Vec3>> {
    if points.len() < 2 {
        return Err(EvoError::geometry("polyline needs at least two points"));
    }
    if n < 2 {
        return Err(EvoError::geometry(format!("cannot resample to {n} points")));
    }
    check_finite(points)?;
    let total = curve_length(points);
    if total <= f64::EPSILON {
        return Err(EvoError::geometry("polyline has zero length"));
    }

    let mut out = Vec::with_capacity(n);
    let mut seg = 0;
    let mut seg_start = 0.0;
    for i in 0..n {
        let target = total * i as f64 / (n - 1) as f64;
        loop {
            let seg_len = points[seg].distance(points[seg + 1]);
            if target <= seg_start + seg_len || seg + 2 == points.len() {
                let t = if seg_len > 0.0 {
                    ((target - seg_start) / seg_len).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                out.push(points[seg].lerp(points[seg + 1], t));
                break;
            }
            seg_start += seg_len;
            seg += 1;
        }
    }
    Ok(out)
}

/// Tuning parameters of the adaptive edge sampler.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    /// Lower bound on points per curve.
    pub min_samples: usize,
    /// Upper bound on points per curve.
    pub max_samples: usize,
    /// Curves up to this length get full resolution.
    pub reference_length: f64,
    /// Animated edge count up to which the edge load does not reduce resolution.
    pub edge_budget: usize,
    /// Score a fresh renderer starts with.
    pub initial_score: i32,
    /// Score below which sample counts are halved once per transition.
    pub score_floor: i32,
    /// Frames longer than this lower the score by 2.
    pub slow_frame_secs: f64,
    /// Frames shorter than this raise the score by 1.
    pub fast_frame_secs: f64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            min_samples: 2,
            max_samples: 75,
            reference_length: 10.0,
            edge_budget: 400,
            initial_score: 10,
            score_floor: 0,
            slow_frame_secs: 1.0 / 30.0,
            fast_frame_secs: 1.0 / 60.0,
        }
    }
}

fn even_up(n: usize) -> usize {
    n + n % 2
}

fn even_down(n: usize) -> usize {
    n - n % 2
}

impl SamplingPolicy {
    /// Effective even `(lo, hi)` bounds after intersecting with [`SAMPLE_BOUNDS`].
    pub fn bounds(&self) -> (usize, usize) {
        let lo = even_up(self.min_samples.max(SAMPLE_BOUNDS.0));
        let hi = even_down(self.max_samples.min(SAMPLE_BOUNDS.1));
        (lo, hi.max(lo))
    }

    /// Reject settings that leave no valid sample count.
    pub fn validate(&self) -> EvoResult<()> {
        if self.min_samples > self.max_samples {
            return Err(EvoError::validation(
                "sampling min_samples must be <= max_samples",
            ));
        }
        let lo = even_up(self.min_samples.max(SAMPLE_BOUNDS.0));
        let hi = even_down(self.max_samples.min(SAMPLE_BOUNDS.1));
        if lo > hi {
            return Err(EvoError::validation(format!(
                "sampling bounds [{}, {}] admit no even count within [2, 75]",
                self.min_samples, self.max_samples
            )));
        }
        if self.reference_length.is_nan() || self.reference_length <= 0.0 || self.initial_score <= 0 {
            return Err(EvoError::validation(
                "sampling reference_length and initial_score must be positive",
            ));
        }
        if self.fast_frame_secs.is_nan()
            || self.fast_frame_secs <= 0.0
            || self.fast_frame_secs > self.slow_frame_secs
        {
            return Err(EvoError::validation(
                "sampling frame thresholds must satisfy 0 < fast <= slow",
            ));
        }
        Ok(())
    }

    /// Points per curve for one matched pair.
    ///
    /// Full resolution is scaled by the score relative to its initial value and reduced for
    /// curves longer than `reference_length`, for growth in the animated edge count since the
    /// last transition and for edge counts above `edge_budget`. The result is even and clamped
    /// to [`SamplingPolicy::bounds`].
    pub fn sample_count(
        &self,
        length: f64,
        score: i32,
        last_edges: usize,
        current_edges: usize,
    ) -> usize {
        let (lo, hi) = self.bounds();
        let ratio = |num: f64, den: f64| if den > num { num / den } else { 1.0 };

        let score = f64::from(score.max(0)) / f64::from(self.initial_score.max(1));
        let length = ratio(self.reference_length, length);
        let growth = if last_edges > 0 {
            ratio(last_edges as f64, current_edges as f64)
        } else {
            1.0
        };
        let budget = ratio(self.edge_budget.max(1) as f64, current_edges as f64);

        let raw = hi as f64 * score * length * growth * budget;
        if !raw.is_finite() {
            return lo;
        }
        even_down((raw.round().max(0.0) as usize).min(hi)).clamp(lo, hi)
    }
}

/// Frame-time feedback counter.
///
/// The score persists across transitions. Degradation fires at most once per transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerformanceScore {
    score: i32,
    degraded: bool,
}

impl PerformanceScore {
    /// Score starting at `initial`.
    pub fn new(initial: i32) -> Self {
        Self {
            score: initial,
            degraded: false,
        }
    }

    /// Current score.
    pub fn value(&self) -> i32 {
        self.score
    }

    /// Whether the current transition already degraded.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Re-arm the one-shot degradation for a new transition.
    pub fn begin_transition(&mut self) {
        self.degraded = false;
    }

    /// Account for one frame of `frame_secs`; returns `true` on the frame that triggers the
    /// one-shot degradation.
    pub fn record_frame(&mut self, frame_secs: f64, policy: &SamplingPolicy) -> bool {
        if frame_secs > policy.slow_frame_secs {
            self.score = self.score.saturating_sub(2);
        } else if frame_secs < policy.fast_frame_secs {
            self.score = self.score.saturating_add(1);
        }
        if self.score < policy.score_floor && !self.degraded {
            self.degraded = true;
            return true;
        }
        false
    }
}

/// Interpolation state of one matched edge pair.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMorph {
    edge_id: String,
    from_line: Vec<Vec3>,
    to_control: Vec<Vec3>,
    from: Vec<Vec3>,
    to: Vec<Vec3>,
    current: Vec<Vec3>,
}

impl EdgeMorph {
    /// Morph from the displayed polyline `from_line` to the curve with control polygon
    /// `to_control`, both sampled onto `samples` points.
    ///
    /// Fails with [`EvoError::Geometry`] for degenerate curves.
    pub fn new(
        edge_id: impl Into<String>,
        from_line: &[Vec3],
        to_control: &[Vec3],
        samples: usize,
    ) -> EvoResult<Self> {
        if curve_length(to_control) <= f64::EPSILON {
            return Err(EvoError::geometry("target curve has zero length"));
        }
        let from = resample_polyline(from_line, samples)?;
        let to = sample_curve(to_control, samples)?;
        Ok(Self {
            edge_id: edge_id.into(),
            from_line: from_line.to_vec(),
            to_control: to_control.to_vec(),
            current: from.clone(),
            from,
            to,
        })
    }

    /// Identity of the matched edge.
    pub fn edge_id(&self) -> &str {
        &self.edge_id
    }

    /// Current point count.
    pub fn samples(&self) -> usize {
        self.current.len()
    }

    /// Points currently displayed.
    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    /// Final points.
    pub fn target(&self) -> &[Vec3] {
        &self.to
    }

    /// Move every point to `lerp(from, to, t)`, `t` clamped to `[0, 1]`.
    pub fn interpolate(&mut self, t: f64) -> &[Vec3] {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            self.current.clone_from(&self.to);
            return &self.current;
        }
        for ((c, a), b) in self.current.iter_mut().zip(&self.from).zip(&self.to) {
            *c = a.lerp(*b, t);
        }
        &self.current
    }

    /// Halve the point count (kept even, at least 2) and resample both curves.
    pub fn halve(&mut self) -> EvoResult<()> {
        let n = even_up((self.samples() / 2).max(SAMPLE_BOUNDS.0));
        if n >= self.samples() {
            return Ok(());
        }
        self.from = resample_polyline(&self.from_line, n)?;
        self.to = sample_curve(&self.to_control, n)?;
        self.current = self.from.clone();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sampler.rs"]
mod tests;
