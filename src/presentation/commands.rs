// Typed user actions, request completions and their outcomes
use crate::application::catalog_service::CatalogReport;
use crate::application::data_source::GraphDataEntry;
use crate::application::requests::RequestToken;
use crate::application::view_service::ViewReport;
use crate::domain::catalog::CatalogPayload;
use crate::domain::graph::Axis;
use crate::domain::mapping::{AxisMapping, StaleMapping};
use crate::domain::view::DefaultView;
use crate::error::{PipelineError, RequestKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEdge {
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadDefaultView,
    RefreshMetricList,
    RefreshExperimentList,
    SelectExperiment(String),
    DeselectExperiment(String),
    SelectMetric(String),
    DeselectMetric(String),
    SetSourceFilter(String),
    SetMetricScale { metric: String, scale: f64 },
    FetchMetrics,
    SetGraphCount(usize),
    SetGraphName { graph: usize, name: String },
    AddMapping(AxisMapping),
    RemoveMapping(usize),
    ClearMappings,
    UpdateView,
    SetTimeWindow { stime: f64, etime: f64 },
    SetAxisWindow { axis: Axis, edge: WindowEdge, percent: f64 },
    SetLegendLabel { index: usize, label: String },
    ExportView,
}

/// Result of a spawned request, posted back to the controller
#[derive(Debug)]
pub enum Completion {
    DefaultView {
        token: RequestToken,
        result: Result<DefaultView, PipelineError>,
    },
    MetricList {
        token: RequestToken,
        result: Result<Vec<String>, PipelineError>,
    },
    ExperimentList {
        token: RequestToken,
        result: Result<Vec<String>, PipelineError>,
    },
    Metrics {
        token: RequestToken,
        result: Result<CatalogPayload, PipelineError>,
    },
    GraphData {
        token: RequestToken,
        result: Result<Vec<GraphDataEntry>, PipelineError>,
    },
}

impl Completion {
    pub fn kind(&self) -> RequestKind {
        match self {
            Completion::DefaultView { .. } => RequestKind::DefaultView,
            Completion::MetricList { .. } => RequestKind::MetricList,
            Completion::ExperimentList { .. } => RequestKind::ExperimentList,
            Completion::Metrics { .. } => RequestKind::Metrics,
            Completion::GraphData { .. } => RequestKind::GraphData,
        }
    }

    pub fn token(&self) -> RequestToken {
        match self {
            Completion::DefaultView { token, .. }
            | Completion::MetricList { token, .. }
            | Completion::ExperimentList { token, .. }
            | Completion::Metrics { token, .. }
            | Completion::GraphData { token, .. } => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// State changed locally, nothing was requested
    Applied,
    NothingToFetch,
    RequestStarted {
        kind: RequestKind,
        token: RequestToken,
    },
    MappingAdded(usize),
    MappingRemoved(AxisMapping),
    GraphsResized {
        stale: Vec<StaleMapping>,
    },
    DefaultViewApplied {
        stale: Vec<StaleMapping>,
    },
    ListUpdated(RequestKind),
    CatalogUpdated(CatalogReport),
    ViewUpdated(ViewReport),
    Exported(String),
}
