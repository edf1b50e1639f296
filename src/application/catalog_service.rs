// Catalog service - metric/experiment discovery and catalog refresh
use crate::application::app_state::AppState;
use crate::application::data_source::{ExperimentDataSource, MetricSourceQuery};
use crate::domain::catalog::{CatalogPayload, PruneReport};
use crate::domain::mapping::StaleMapping;
use crate::domain::view::DefaultView;
use crate::error::{PipelineError, RequestKind};
use std::sync::Arc;
use std::time::Instant;

/// What a successful metrics fetch changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogReport {
    pub pruned: PruneReport,
    pub stale_mappings: Vec<StaleMapping>,
}

#[derive(Clone)]
pub struct CatalogService {
    source: Arc<dyn ExperimentDataSource>,
}

impl CatalogService {
    pub fn new(source: Arc<dyn ExperimentDataSource>) -> Self {
        Self { source }
    }

    pub async fn metric_list(&self) -> Result<Vec<String>, PipelineError> {
        self.source
            .fetch_metric_list()
            .await
            .map_err(|e| PipelineError::fetch_failure(RequestKind::MetricList, e))
    }

    pub async fn experiment_list(&self) -> Result<Vec<String>, PipelineError> {
        self.source
            .fetch_experiment_list()
            .await
            .map_err(|e| PipelineError::fetch_failure(RequestKind::ExperimentList, e))
    }

    pub async fn default_view(&self) -> Result<DefaultView, PipelineError> {
        self.source
            .fetch_default_view()
            .await
            .map_err(|e| PipelineError::fetch_failure(RequestKind::DefaultView, e))
    }

    pub async fn metric_sources(
        &self,
        query: &MetricSourceQuery,
    ) -> Result<CatalogPayload, PipelineError> {
        let started = Instant::now();
        let payload = self
            .source
            .fetch_metric_data_sources(query)
            .await
            .map_err(|e| PipelineError::fetch_failure(RequestKind::Metrics, e))?;

        tracing::debug!(
            "Fetched {} metrics for {} experiments in {}ms",
            payload.len(),
            query.exp_id.len(),
            started.elapsed().as_millis()
        );
        Ok(payload)
    }

    /// Snapshot of the current selection, sent with a metrics fetch
    pub fn query(state: &AppState) -> MetricSourceQuery {
        MetricSourceQuery {
            exp_id: state.experiments.as_slice().to_vec(),
            src_filter: state.source_filter.clone(),
            metrics: state.metrics.as_slice().to_vec(),
            yscale: state.scales.clone(),
        }
    }

    /// Replace the catalog and drop mappings that referenced pruned data
    pub fn apply_catalog(state: &mut AppState, payload: CatalogPayload) -> CatalogReport {
        let pruned = state.catalog.replace(payload);
        for metric in &pruned.metrics {
            tracing::debug!("Pruned metric {} from catalog", metric);
        }

        let stale_mappings = state
            .mappings
            .prune_stale(&state.catalog, state.graphs.len());
        for stale in &stale_mappings {
            tracing::warn!("Dropped stale mapping {}: {}", stale.index, stale.reason);
        }

        CatalogReport {
            pruned,
            stale_mappings,
        }
    }
}
