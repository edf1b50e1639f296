// Metric identifiers and per-metric display scales
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const TIME: &str = "TIME";
pub const NOTHING: &str = "NOTHING";

/// A metric as it appears on an axis: a measured quantity or one of the pseudo-metrics
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricRef {
    Time,
    Nothing,
    Named(String),
}

impl MetricRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    pub fn is_pseudo(&self) -> bool {
        !matches!(self, MetricRef::Named(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            MetricRef::Time => TIME,
            MetricRef::Nothing => NOTHING,
            MetricRef::Named(name) => name,
        }
    }
}

impl From<String> for MetricRef {
    fn from(value: String) -> Self {
        match value.as_str() {
            TIME => MetricRef::Time,
            NOTHING => MetricRef::Nothing,
            _ => MetricRef::Named(value),
        }
    }
}

impl From<&str> for MetricRef {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<MetricRef> for String {
    fn from(value: MetricRef) -> Self {
        match value {
            MetricRef::Named(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MetricRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-adjustable display scale per metric, sent along with every data request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricScales {
    scales: BTreeMap<String, f64>,
}

impl Default for MetricScales {
    fn default() -> Self {
        let scales = [
            ("spprtt", 1000.0),
            ("ackseq", 0.001),
            ("throughput", 0.001),
            ("goodput", 0.001),
            ("cwnd", 0.001),
        ]
        .into_iter()
        .map(|(metric, scale)| (metric.to_string(), scale))
        .collect();

        Self { scales }
    }
}

impl MetricScales {
    pub const DEFAULT_SCALE: f64 = 1.0;

    /// Scale applied to an axis; pseudo-metrics are never scaled
    pub fn scale_for(&self, metric: &MetricRef) -> f64 {
        match metric {
            MetricRef::Named(name) => self.get(name),
            _ => Self::DEFAULT_SCALE,
        }
    }

    pub fn get(&self, metric: &str) -> f64 {
        self.scales
            .get(metric)
            .copied()
            .unwrap_or(Self::DEFAULT_SCALE)
    }

    /// Zero or non-finite input falls back to the default scale
    pub fn set(&mut self, metric: impl Into<String>, scale: f64) {
        let scale = if scale.is_finite() && scale != 0.0 {
            scale
        } else {
            Self::DEFAULT_SCALE
        };
        self.scales.insert(metric.into(), scale);
    }
}
