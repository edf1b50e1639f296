// Pipeline error kinds, scoped to the user action that triggered them
use std::fmt;
use thiserror::Error;

/// The asynchronous requests the pipeline issues against the experiment server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    DefaultView,
    MetricList,
    ExperimentList,
    Metrics,
    GraphData,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::DefaultView => "default view",
            RequestKind::MetricList => "metric list",
            RequestKind::ExperimentList => "experiment list",
            RequestKind::Metrics => "metric data sources",
            RequestKind::GraphData => "graph data",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Rejected before submission; the mapping table is left unchanged
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    /// One mapping had no data in a graph response; the rest of the batch proceeds
    #[error("no data for mapping {mapping} ({metric}/{flow}, dataset {dataset})")]
    MissingSeriesData {
        mapping: usize,
        metric: String,
        flow: String,
        dataset: usize,
    },

    /// Transport or server failure; prior state is preserved
    #[error("{kind} request failed: {message}")]
    FetchFailure { kind: RequestKind, message: String },

    /// The response belongs to a request that has since been superseded
    #[error("discarded stale {kind} response (token {token})")]
    StaleResponse { kind: RequestKind, token: u64 },

    /// A request of the same kind is still outstanding
    #[error("a {0} request is already in flight")]
    Busy(RequestKind),
}

impl PipelineError {
    pub fn fetch_failure(kind: RequestKind, err: anyhow::Error) -> Self {
        PipelineError::FetchFailure {
            kind,
            message: format!("{:#}", err),
        }
    }

    /// Stale responses are dropped quietly rather than surfaced to the user
    pub fn is_silent(&self) -> bool {
        matches!(self, PipelineError::StaleResponse { .. })
    }
}
