// Boundary trait for the experiment server
use crate::domain::catalog::{CatalogPayload, Dataset};
use crate::domain::mapping::SeriesRequest;
use crate::domain::metric::MetricScales;
use crate::domain::view::DefaultView;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Selection sent when asking for the flows available under each metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSourceQuery {
    pub exp_id: Vec<String>,
    pub src_filter: String,
    pub metrics: Vec<String>,
    pub yscale: MetricScales,
}

/// Series data returned for one mapping
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphDataEntry {
    pub map: usize,
    #[serde(default)]
    pub plot: Vec<Dataset>,
}

impl GraphDataEntry {
    /// Only the first plot of an entry is drawn
    pub fn dataset(&self) -> Option<&Dataset> {
        self.plot.first()
    }
}

#[async_trait]
pub trait ExperimentDataSource: Send + Sync {
    /// Names of all metrics the server can extract
    async fn fetch_metric_list(&self) -> anyhow::Result<Vec<String>>;

    /// Experiment ids known to the server
    async fn fetch_experiment_list(&self) -> anyhow::Result<Vec<String>>;

    /// Preset view to start from
    async fn fetch_default_view(&self) -> anyhow::Result<DefaultView>;

    /// Flows and datasets for the selected experiments and metrics
    async fn fetch_metric_data_sources(
        &self,
        query: &MetricSourceQuery,
    ) -> anyhow::Result<CatalogPayload>;

    /// Raw series for every mapping in the request
    async fn fetch_graph_data(
        &self,
        requests: &[SeriesRequest],
    ) -> anyhow::Result<Vec<GraphDataEntry>>;
}
