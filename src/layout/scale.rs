use crate::foundation::error::{EvoError, EvoResult};
use crate::graph::model::Graph;
use std::collections::BTreeMap;

/// How raw metric values are normalized before being mapped onto block lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScalingMode {
    /// Min/max normalization over the whole series.
    #[default]
    #[serde(rename = "linear")]
    Linear,
    /// Distance from the series minimum in standard deviations, saturating at the
    /// [`Scaler::zscore_window`] (in σ).
    #[serde(rename = "zscore")]
    ZScore,
}

#[derive(Clone, Copy, Debug)]
struct MetricStats {
    min: f64,
    max: f64,
    mean: f64,
    std_dev: f64,
}

impl MetricStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            min,
            max,
            mean,
            std_dev: var.sqrt(),
        })
    }

    fn z(&self, v: f64) -> f64 {
        if self.std_dev > 0.0 {
            (v - self.mean) / self.std_dev
        } else {
            0.0
        }
    }
}

/// Maps raw metric values onto bounded visual lengths.
///
/// A scaler is fitted once over every snapshot of a series so that the same raw value yields the
/// same length in every revision.
#[derive(Clone, Debug)]
pub struct Scaler {
    mode: ScalingMode,
    min_length: f64,
    max_length: f64,
    zscore_window: f64,
    stats: BTreeMap<String, MetricStats>,
}

/// Default half-width of the z-score window, in standard deviations.
pub const DEFAULT_ZSCORE_WINDOW: f64 = 3.0;

impl Scaler {
    /// Fit a scaler for `metrics` over all node values found in `graphs`.
    pub fn new<'a>(
        mode: ScalingMode,
        graphs: impl IntoIterator<Item = &'a Graph>,
        metrics: &[String],
        min_length: f64,
        max_length: f64,
    ) -> EvoResult<Self> {
        if !(min_length.is_finite() && max_length.is_finite()) || min_length < 0.0 {
            return Err(EvoError::validation(
                "scaler lengths must be finite and non-negative",
            ));
        }
        if min_length > max_length {
            return Err(EvoError::validation(
                "scaler min_length must be <= max_length",
            ));
        }

        let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for graph in graphs {
            for node in graph.nodes() {
                for metric in metrics {
                    if let Some(v) = node.attributes.numeric(metric).filter(|v| v.is_finite()) {
                        values.entry(metric.as_str()).or_default().push(v);
                    }
                }
            }
        }
        let stats = values
            .into_iter()
            .filter_map(|(k, v)| MetricStats::from_values(&v).map(|s| (k.to_string(), s)))
            .collect();

        Ok(Self {
            mode,
            min_length,
            max_length,
            zscore_window: DEFAULT_ZSCORE_WINDOW,
            stats,
        })
    }

    /// Use a z-score window of `±sigmas`; values beyond `+sigmas` saturate at `max_length`.
    pub fn with_zscore_window(mut self, sigmas: f64) -> EvoResult<Self> {
        if !sigmas.is_finite() || sigmas <= 0.0 {
            return Err(EvoError::validation("z-score window must be finite and positive"));
        }
        self.zscore_window = sigmas;
        Ok(self)
    }

    /// Half-width of the z-score window, in standard deviations.
    pub fn zscore_window(&self) -> f64 {
        self.zscore_window
    }

    /// Normalization mode.
    pub fn mode(&self) -> ScalingMode {
        self.mode
    }

    /// Map a raw `value` of `metric` into `[min_length, max_length]`.
    ///
    /// Linear mode spans the series-wide min/max. Z-score mode measures the distance from the
    /// series minimum in standard deviations; `+zscore_window` σ maps to `max_length`.
    /// Unknown metrics and series where the metric never varies map to `min_length`.
    pub fn normalize(&self, metric: &str, value: f64) -> f64 {
        let Some(s) = self.stats.get(metric) else {
            return self.min_length;
        };
        let (lo, hi, v) = match self.mode {
            ScalingMode::Linear => (s.min, s.max, value),
            ScalingMode::ZScore => {
                let k = self.zscore_window;
                (s.z(s.min).clamp(-k, k), k, s.z(value).clamp(-k, k))
            }
        };
        if hi <= lo || !v.is_finite() {
            return self.min_length;
        }
        let frac = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
        self.min_length + frac * (self.max_length - self.min_length)
    }

    /// Normalized value of `metric` on node `id` of `graph`; missing values map to `min_length`.
    pub fn normalized_value(&self, metric: &str, graph: &Graph, id: &str) -> f64 {
        graph
            .numeric(id, metric)
            .map_or(self.min_length, |v| self.normalize(metric, v))
    }

    /// Largest value [`Scaler::normalize`] can return.
    pub fn normalized_maximum(&self) -> f64 {
        self.max_length
    }

    /// Smallest value [`Scaler::normalize`] can return.
    pub fn normalized_minimum(&self) -> f64 {
        self.min_length
    }

    /// Discrete style for node `id`, in `[0, style_count - 1]`.
    pub fn style_index(&self, metric: &str, graph: &Graph, id: &str, style_count: usize) -> usize {
        style_index(
            self.normalized_value(metric, graph, id),
            self.min_length,
            self.max_length,
            style_count,
        )
    }
}

/// Linearly interpolate `value` within `[lo, hi]` onto the style range `[0, style_count - 1]`.
pub fn style_index(value: f64, lo: f64, hi: f64, style_count: usize) -> usize {
    if style_count == 0 {
        return 0;
    }
    let top = (style_count - 1) as f64;
    let frac = if hi > lo && value.is_finite() {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((frac * top).round() as usize).min(style_count - 1)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/scale.rs"]
mod tests;
