// Test doubles for the data source and render sink boundaries
use crate::application::data_source::{ExperimentDataSource, GraphDataEntry, MetricSourceQuery};
use crate::application::render_sink::RenderSink;
use crate::domain::catalog::CatalogPayload;
use crate::domain::colour::LegendEntry;
use crate::domain::graph::{Axis, Extents, Graph};
use crate::domain::mapping::SeriesRequest;
use crate::domain::series::Series;
use crate::domain::view::DefaultView;
use crate::domain::window::ViewWindow;
use async_trait::async_trait;
use std::sync::Mutex;

/// Canned server responses; every request is recorded
#[derive(Default)]
pub struct FakeDataSource {
    pub metric_list: Mutex<Vec<String>>,
    pub experiments: Mutex<Vec<String>>,
    pub default_view: Mutex<DefaultView>,
    pub catalog: Mutex<CatalogPayload>,
    pub graph_data: Mutex<Vec<GraphDataEntry>>,
    pub failure: Mutex<Option<String>>,
    pub metric_queries: Mutex<Vec<MetricSourceQuery>>,
    pub graph_requests: Mutex<Vec<Vec<SeriesRequest>>>,
}

impl FakeDataSource {
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    fn check(&self) -> anyhow::Result<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExperimentDataSource for FakeDataSource {
    async fn fetch_metric_list(&self) -> anyhow::Result<Vec<String>> {
        self.check()?;
        Ok(self.metric_list.lock().unwrap().clone())
    }

    async fn fetch_experiment_list(&self) -> anyhow::Result<Vec<String>> {
        self.check()?;
        Ok(self.experiments.lock().unwrap().clone())
    }

    async fn fetch_default_view(&self) -> anyhow::Result<DefaultView> {
        self.check()?;
        Ok(self.default_view.lock().unwrap().clone())
    }

    async fn fetch_metric_data_sources(
        &self,
        query: &MetricSourceQuery,
    ) -> anyhow::Result<CatalogPayload> {
        self.metric_queries.lock().unwrap().push(query.clone());
        self.check()?;
        Ok(self.catalog.lock().unwrap().clone())
    }

    async fn fetch_graph_data(
        &self,
        requests: &[SeriesRequest],
    ) -> anyhow::Result<Vec<GraphDataEntry>> {
        self.graph_requests.lock().unwrap().push(requests.to_vec());
        self.check()?;
        Ok(self.graph_data.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    AddGraph(usize),
    RemoveGraph(usize),
    ClearSeries(usize),
    AddSeries(usize, usize),
    AxisLabel(usize, Axis, String),
    DisplayRange(usize, Extents),
    GraphName(usize, String),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    pub legend: Vec<LegendEntry>,
    pub window: Option<ViewWindow>,
}

impl RenderSink for RecordingSink {
    fn add_graph(&mut self, graph: &Graph) {
        self.events.push(SinkEvent::AddGraph(graph.id));
    }

    fn remove_graph(&mut self, graph: usize) {
        self.events.push(SinkEvent::RemoveGraph(graph));
    }

    fn clear_series(&mut self, graph: usize) {
        self.events.push(SinkEvent::ClearSeries(graph));
    }

    fn add_series(&mut self, graph: usize, series: &Series) {
        self.events.push(SinkEvent::AddSeries(graph, series.mapping));
    }

    fn set_axis_label(&mut self, graph: usize, axis: Axis, metric: &str) {
        self.events
            .push(SinkEvent::AxisLabel(graph, axis, metric.to_string()));
    }

    fn set_display_range(&mut self, graph: usize, range: &Extents) {
        self.events.push(SinkEvent::DisplayRange(graph, *range));
    }

    fn set_graph_name(&mut self, graph: usize, name: &str) {
        self.events.push(SinkEvent::GraphName(graph, name.to_string()));
    }

    fn set_visible_window(&mut self, window: &ViewWindow) {
        self.window = Some(*window);
    }

    fn set_legend(&mut self, legend: &[LegendEntry]) {
        self.legend = legend.to_vec();
    }
}
