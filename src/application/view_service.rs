// View service - turns fetched graph data into scaled, coloured series on the graphs
use crate::application::app_state::{AppState, Selection};
use crate::application::data_source::{ExperimentDataSource, GraphDataEntry};
use crate::application::normalizer::normalize;
use crate::application::render_sink::RenderSink;
use crate::domain::graph::Axis;
use crate::domain::mapping::{SeriesRequest, StaleMapping};
use crate::domain::series::Series;
use crate::domain::view::DefaultView;
use crate::domain::window::{PercentRange, TimeWindow};
use crate::error::{PipelineError, RequestKind};
use std::sync::Arc;
use std::time::Instant;

/// Result of applying one graph data response
#[derive(Debug, Clone, PartialEq)]
pub struct ViewReport {
    pub plotted: usize,
    pub skipped: Vec<PipelineError>,
    pub highest_time: f64,
    pub x_window: PercentRange,
}

#[derive(Clone)]
pub struct ViewService {
    source: Arc<dyn ExperimentDataSource>,
}

impl ViewService {
    pub fn new(source: Arc<dyn ExperimentDataSource>) -> Self {
        Self { source }
    }

    pub async fn graph_data(
        &self,
        requests: &[SeriesRequest],
    ) -> Result<Vec<GraphDataEntry>, PipelineError> {
        let started = Instant::now();
        let entries = self
            .source
            .fetch_graph_data(requests)
            .await
            .map_err(|e| PipelineError::fetch_failure(RequestKind::GraphData, e))?;

        tracing::debug!(
            "Fetched {} series for {} mappings in {}ms",
            entries.len(),
            requests.len(),
            started.elapsed().as_millis()
        );
        Ok(entries)
    }

    /// Rebuild every graph's series from a graph data response.
    ///
    /// All existing series are destroyed first; graphs that receive no data keep their
    /// previous axis label range.
    pub fn apply_graph_data(
        state: &mut AppState,
        entries: &[GraphDataEntry],
        sink: &mut dyn RenderSink,
    ) -> ViewReport {
        let normalization = normalize(entries, &state.mappings, &state.graphs);

        for graph in state.graphs.iter_mut() {
            graph.clear_series();
            sink.clear_series(graph.id);
        }

        for (&index, range) in &normalization.label_ranges {
            if let Some(graph) = state.graphs.get_mut(index) {
                graph.axis_label_range = *range;
                sink.set_display_range(index, range);
            }
        }

        let mut plotted = 0;
        for scaled in normalization.series {
            let Some(mapping) = state.mappings.get(scaled.mapping).cloned() else {
                continue;
            };
            let colour = state.colours.colour_for(&scaled.flow);
            let Some(graph) = state.graphs.get_mut(scaled.graph) else {
                continue;
            };

            let series = Series {
                mapping: scaled.mapping,
                flow: scaled.flow,
                points: scaled.points,
                scale: scaled.scale,
                colour,
            };
            sink.add_series(graph.id, &series);
            graph.add_series(series);
            plotted += 1;

            for (axis, metric) in [
                (Axis::X, &mapping.xaxis.metric),
                (Axis::Y, &mapping.metric),
                (Axis::Z, &mapping.zaxis.metric),
            ] {
                graph.set_axis_label(axis, metric.as_str());
                sink.set_axis_label(graph.id, axis, metric.as_str());
            }

            if graph.name.is_empty() {
                graph.name = mapping.metric.to_string();
                sink.set_graph_name(graph.id, &graph.name);
            }
        }

        state.highest_time = normalization.highest_time;
        Self::apply_time_window(state, sink);
        sink.set_legend(&state.colours.legend());

        tracing::info!(
            "Plotted {} series across {} graphs ({} skipped)",
            plotted,
            normalization.label_ranges.len(),
            normalization.skipped.len()
        );

        ViewReport {
            plotted,
            skipped: normalization.skipped,
            highest_time: state.highest_time,
            x_window: state.view_window.x,
        }
    }

    /// Clip every graph's x axis to the configured time window
    pub fn apply_time_window(state: &mut AppState, sink: &mut dyn RenderSink) {
        state.view_window.x = state.time_window.percent_range(state.highest_time);
        sink.set_visible_window(&state.view_window);
    }

    pub fn resize_graphs(
        state: &mut AppState,
        count: usize,
        sink: &mut dyn RenderSink,
    ) -> Vec<StaleMapping> {
        let outcome = state.graphs.resize(count);
        for graph in &outcome.removed {
            sink.remove_graph(graph.id);
        }
        for index in outcome.added {
            if let Some(graph) = state.graphs.get(index) {
                sink.add_graph(graph);
            }
        }

        let stale = state
            .mappings
            .prune_stale(&state.catalog, state.graphs.len());
        for mapping in &stale {
            tracing::warn!("Dropped mapping {}: {}", mapping.index, mapping.reason);
        }
        stale
    }

    pub fn rename_graph(
        state: &mut AppState,
        index: usize,
        name: impl Into<String>,
        sink: &mut dyn RenderSink,
    ) -> bool {
        let Some(graph) = state.graphs.get_mut(index) else {
            return false;
        };
        graph.name = name.into();
        sink.set_graph_name(index, &graph.name);
        true
    }

    /// Adopt the server's preset: selection, labels, graphs and time window
    pub fn apply_default_view(
        state: &mut AppState,
        view: DefaultView,
        sink: &mut dyn RenderSink,
    ) -> Vec<StaleMapping> {
        state.experiments = Selection::from_vec(view.test_id);
        state.source_filter = view.source_filter;
        state.metrics = Selection::from_vec(view.metric);
        state.colours.set_labels(view.lnames);

        let stale = Self::resize_graphs(state, view.graph_count, sink);
        for (index, name) in view.graph_names.into_iter().enumerate().take(view.graph_count) {
            Self::rename_graph(state, index, name, sink);
        }

        state.time_window = TimeWindow::new(view.stime, view.etime);
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::catalog_service::CatalogService;
    use crate::application::test_support::{RecordingSink, SinkEvent};
    use crate::domain::catalog::{CatalogPayload, Dataset, Flow};
    use crate::domain::mapping::AxisMapping;

    fn state_with(flows: &[&str], graphs: usize) -> AppState {
        let mut state = AppState::default();
        state.graphs.resize(graphs);
        let flows = flows
            .iter()
            .map(|f| {
                (
                    f.to_string(),
                    Flow {
                        datasets: vec![Dataset::default()],
                        ..Flow::default()
                    },
                )
            })
            .collect();
        let payload: CatalogPayload = [("cwnd".to_string(), flows)].into_iter().collect();
        CatalogService::apply_catalog(&mut state, payload);
        state
    }

    fn entry(map: usize, points: &[[f64; 2]]) -> GraphDataEntry {
        GraphDataEntry {
            map,
            plot: vec![points.iter().copied().collect()],
        }
    }

    #[test]
    fn test_apply_graph_data_scenario() {
        let mut state = state_with(&["f1"], 1);
        state.mappings.add(AxisMapping::new("cwnd", "f1", 0), &state.catalog, 1).unwrap();
        let mut sink = RecordingSink::default();

        let report = ViewService::apply_graph_data(
            &mut state,
            &[entry(0, &[[0.0, 1.0], [10.0, 2.0]])],
            &mut sink,
        );

        assert_eq!(report.plotted, 1);
        let graph = state.graphs.get(0).unwrap();
        assert_eq!(graph.axis_label_range.x.max, 10.0);
        assert_eq!(graph.axis_label_range.y.max, 2.0);
        assert_eq!(graph.series()[0].scale.x, 10.0);
        assert_eq!(graph.series()[0].scale.y, 50.0);
        assert_eq!(graph.name, "cwnd");
        assert_eq!(graph.axis_label(Axis::X), "TIME");
        assert_eq!(graph.axis_label(Axis::Z), "NOTHING");
        assert!(sink.events.contains(&SinkEvent::GraphName(0, "cwnd".into())));
        assert_eq!(sink.legend.len(), 1);
    }

    #[test]
    fn test_refresh_recreates_series_and_keeps_colours() {
        let mut state = state_with(&["f1", "f2"], 1);
        state.mappings.add(AxisMapping::new("cwnd", "f2", 0), &state.catalog, 1).unwrap();
        state.mappings.add(AxisMapping::new("cwnd", "f1", 0), &state.catalog, 1).unwrap();
        let mut sink = RecordingSink::default();
        let entries = [entry(0, &[[1.0, 1.0]]), entry(1, &[[2.0, 2.0]])];

        ViewService::apply_graph_data(&mut state, &entries, &mut sink);
        let first: Vec<_> = state.graphs.get(0).unwrap().series().to_vec();
        ViewService::apply_graph_data(&mut state, &entries, &mut sink);
        let second = state.graphs.get(0).unwrap().series();

        assert_eq!(second.len(), 2);
        assert_eq!(first, second);
        assert_eq!(state.colours.assignment("f2").unwrap().index, 0);
        assert_eq!(state.colours.assignment("f1").unwrap().index, 1);
    }

    #[test]
    fn test_graph_without_data_keeps_previous_range() {
        let mut state = state_with(&["f1"], 2);
        state.graphs.get_mut(1).unwrap().axis_label_range.y.max = 42.0;
        state.mappings.add(AxisMapping::new("cwnd", "f1", 0), &state.catalog, 2).unwrap();
        let mut sink = RecordingSink::default();

        ViewService::apply_graph_data(&mut state, &[entry(0, &[[5.0, 5.0]])], &mut sink);

        assert_eq!(state.graphs.get(1).unwrap().axis_label_range.y.max, 42.0);
        assert_eq!(state.graphs.get(1).unwrap().axis_label_range.x.max, 0.0);
    }

    #[test]
    fn test_time_window_applied_after_refresh() {
        let mut state = state_with(&["f1"], 1);
        state.time_window = TimeWindow::new(5.0, 0.0);
        state.mappings.add(AxisMapping::new("cwnd", "f1", 0), &state.catalog, 1).unwrap();
        let mut sink = RecordingSink::default();

        let report = ViewService::apply_graph_data(&mut state, &[entry(0, &[[20.0, 1.0]])], &mut sink);

        assert_eq!(report.highest_time, 20.0);
        assert_eq!(report.x_window, PercentRange::new(25.0, 100.0));
        assert_eq!(sink.window.unwrap().x.min(), 25.0);
    }

    #[test]
    fn test_resize_drops_mappings_on_removed_graphs() {
        let mut state = state_with(&["f1"], 1);
        let mut sink = RecordingSink::default();
        ViewService::resize_graphs(&mut state, 3, &mut sink);
        state.mappings.add(AxisMapping::new("cwnd", "f1", 2), &state.catalog, 3).unwrap();
        state.mappings.add(AxisMapping::new("cwnd", "f1", 0), &state.catalog, 3).unwrap();

        let stale = ViewService::resize_graphs(&mut state, 1, &mut sink);

        assert_eq!(stale.len(), 1);
        assert_eq!(state.mappings.len(), 1);
        assert!(sink.events.contains(&SinkEvent::AddGraph(2)));
        assert!(sink.events.contains(&SinkEvent::RemoveGraph(2)));
        assert!(sink.events.contains(&SinkEvent::RemoveGraph(1)));
    }

    #[test]
    fn test_apply_default_view() {
        let mut state = AppState::default();
        let mut sink = RecordingSink::default();
        let view = DefaultView {
            test_id: vec!["exp1".into()],
            source_filter: "S_*".into(),
            metric: vec!["cwnd".into(), "spprtt".into()],
            lnames: vec!["Reno".into()],
            graph_count: 2,
            graph_names: vec!["a".into(), "b".into(), "c".into()],
            stime: 1.0,
            etime: 9.0,
        };

        ViewService::apply_default_view(&mut state, view, &mut sink);

        assert_eq!(state.graphs.len(), 2);
        assert_eq!(state.graphs.names(), vec!["a", "b"]);
        assert_eq!(state.metrics.as_slice().len(), 2);
        assert_eq!(state.colours.display_name(0), "Reno");
        assert_eq!(state.time_window, TimeWindow::new(1.0, 9.0));
    }
}
