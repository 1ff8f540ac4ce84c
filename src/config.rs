use crate::animation::ease::Ease;
use crate::animation::sampler::SamplingPolicy;
use crate::foundation::error::{EvoError, EvoResult};
use crate::layout::pipeline::{BlockMetrics, Sublayout};
use crate::layout::scale::{DEFAULT_ZSCORE_WINDOW, ScalingMode};
use crate::layout::strategy::{LayoutParams, LayoutRegistry};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Timing of transitions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Length of one transition, in seconds.
    pub duration_secs: f64,
    /// Lower bound on the length of a transition.
    pub minimal_wait_secs: f64,
    /// Length of the sink animation of removed nodes; `None` uses `duration_secs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removal_duration_secs: Option<f64>,
    /// Easing of node tweens.
    pub ease: Ease,
    /// Adaptive edge-sampling policy.
    pub sampling: SamplingPolicy,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration_secs: 2.0,
            minimal_wait_secs: 0.1,
            removal_duration_secs: None,
            ease: Ease::default(),
            sampling: SamplingPolicy::default(),
        }
    }
}

impl AnimationSettings {
    /// Effective duration of removal animations.
    pub fn removal_duration(&self) -> f64 {
        self.removal_duration_secs.unwrap_or(self.duration_secs)
    }

    /// Time after which a transition may finish.
    pub fn transition_time(&self) -> f64 {
        self.duration_secs.max(self.minimal_wait_secs)
    }
}

/// Everything that configures layout and playback of a series.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EvolutionSettings {
    /// Registered node-layout name.
    pub node_layout: String,
    /// Registered edge-layout name; `none` draws no edges.
    pub edge_layout: String,
    /// Subtrees laid out by their own strategy.
    pub sublayouts: Vec<Sublayout>,
    /// Metric normalization.
    pub scaling: ScalingMode,
    /// Half-width of the window used by [`ScalingMode::ZScore`], in standard deviations.
    pub zscore_window: f64,
    /// Shortest block edge.
    pub min_block_length: f64,
    /// Longest block edge.
    pub max_block_length: f64,
    /// Metric mapped onto block width (x).
    pub width_metric: String,
    /// Metric mapped onto block height (y).
    pub height_metric: String,
    /// Metric mapped onto block depth (z).
    pub depth_metric: String,
    /// Metric selecting the node style.
    pub style_metric: String,
    /// Number of discrete node styles.
    pub style_count: usize,
    /// Attributes compared to detect changed nodes; empty compares every numeric attribute.
    pub diff_attributes: Vec<String>,
    /// Spacing of the built-in layouts.
    pub layout: LayoutParams,
    /// Transition timing and edge sampling.
    pub animation: AnimationSettings,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        let metrics = BlockMetrics::default();
        Self {
            node_layout: "grid".to_string(),
            edge_layout: "spline".to_string(),
            sublayouts: Vec::new(),
            scaling: ScalingMode::Linear,
            zscore_window: DEFAULT_ZSCORE_WINDOW,
            min_block_length: 0.1,
            max_block_length: 10.0,
            width_metric: metrics.width,
            height_metric: metrics.height,
            depth_metric: metrics.depth,
            style_metric: metrics.style,
            style_count: 10,
            diff_attributes: Vec::new(),
            layout: LayoutParams::default(),
            animation: AnimationSettings::default(),
        }
    }
}

impl EvolutionSettings {
    /// Parse settings from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> EvoResult<Self> {
        serde_json::from_reader(r).map_err(|e| EvoError::serde(format!("parse settings JSON: {e}")))
    }

    /// Parse settings from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> EvoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EvoError::validation(format!("open settings JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Metric names as used by the layout pipeline.
    pub fn block_metrics(&self) -> BlockMetrics {
        BlockMetrics {
            width: self.width_metric.clone(),
            height: self.height_metric.clone(),
            depth: self.depth_metric.clone(),
            style: self.style_metric.clone(),
        }
    }

    /// Check the settings against `registry`.
    pub fn validate(&self, registry: &LayoutRegistry) -> EvoResult<()> {
        if !registry.has_node_layout(&self.node_layout) {
            return Err(EvoError::validation(format!(
                "unknown node layout '{}'",
                self.node_layout
            )));
        }
        if !registry.has_edge_layout(&self.edge_layout) {
            return Err(EvoError::validation(format!(
                "unknown edge layout '{}'",
                self.edge_layout
            )));
        }
        for s in &self.sublayouts {
            if !registry.has_node_layout(&s.layout) {
                return Err(EvoError::validation(format!(
                    "sub-layout '{}' uses unknown node layout '{}'",
                    s.root, s.layout
                )));
            }
        }
        if self.min_block_length > self.max_block_length {
            return Err(EvoError::validation(
                "min_block_length must be <= max_block_length",
            ));
        }
        if self.style_count == 0 {
            return Err(EvoError::validation("style_count must be positive"));
        }
        if !self.zscore_window.is_finite() || self.zscore_window <= 0.0 {
            return Err(EvoError::validation("zscore_window must be finite and positive"));
        }
        let a = &self.animation;
        let durations = [
            a.duration_secs,
            a.minimal_wait_secs,
            a.removal_duration(),
        ];
        if durations.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(EvoError::validation(
                "animation durations must be finite and non-negative",
            ));
        }
        let p = &self.layout;
        if [p.gap, p.padding, p.inner_node_height]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(EvoError::validation(
                "layout gap, padding and inner_node_height must be finite and non-negative",
            ));
        }
        a.sampling.validate()
    }
}
