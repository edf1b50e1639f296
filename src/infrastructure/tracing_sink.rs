// Render sink that reports scene changes as structured log events
use crate::application::render_sink::RenderSink;
use crate::domain::colour::LegendEntry;
use crate::domain::graph::{Axis, Extents, Graph};
use crate::domain::series::Series;
use crate::domain::window::ViewWindow;

/// Headless sink; keeps a count of plotted series per graph for the log
#[derive(Debug, Default)]
pub struct TracingRenderSink {
    series_per_graph: Vec<usize>,
}

impl RenderSink for TracingRenderSink {
    fn add_graph(&mut self, graph: &Graph) {
        if self.series_per_graph.len() <= graph.id {
            self.series_per_graph.resize(graph.id + 1, 0);
        }
        tracing::info!(
            graph = graph.id,
            origin_y = graph.origin.y,
            "Graph added"
        );
    }

    fn remove_graph(&mut self, graph: usize) {
        self.series_per_graph.truncate(graph);
        tracing::info!(graph, "Graph removed");
    }

    fn clear_series(&mut self, graph: usize) {
        if let Some(count) = self.series_per_graph.get_mut(graph) {
            *count = 0;
        }
    }

    fn add_series(&mut self, graph: usize, series: &Series) {
        let on_graph = match self.series_per_graph.get_mut(graph) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => 0,
        };
        tracing::info!(
            graph,
            on_graph,
            flow = %series.flow,
            points = series.points.len(),
            colour = %series.colour.to_hex(),
            x_scale = series.scale.x,
            y_scale = series.scale.y,
            z_scale = series.scale.z,
            "Series added"
        );
    }

    fn set_axis_label(&mut self, graph: usize, axis: Axis, metric: &str) {
        tracing::debug!(graph, %axis, metric, "Axis label");
    }

    fn set_display_range(&mut self, graph: usize, range: &Extents) {
        tracing::debug!(
            graph,
            x = range.x.max,
            y = range.y.max,
            z = range.z.max,
            "Display range"
        );
    }

    fn set_graph_name(&mut self, graph: usize, name: &str) {
        tracing::info!(graph, name, "Graph renamed");
    }

    fn set_visible_window(&mut self, window: &ViewWindow) {
        tracing::debug!(
            x_min = window.x.min(),
            x_max = window.x.max(),
            "Visible window"
        );
    }

    fn set_legend(&mut self, legend: &[LegendEntry]) {
        for entry in legend {
            tracing::info!(
                index = entry.index,
                flow = %entry.flow,
                label = %entry.label,
                colour = %entry.colour.to_hex(),
                "Legend"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::app_state::AppState;
    use crate::application::data_source::GraphDataEntry;
    use crate::application::view_service::ViewService;
    use crate::domain::catalog::{Dataset, Flow};
    use crate::domain::mapping::AxisMapping;

    #[test]
    fn test_counts_series_per_graph() {
        let mut state = AppState::default();
        let mut sink = TracingRenderSink::default();
        ViewService::resize_graphs(&mut state, 2, &mut sink);
        state.catalog.replace(
            [(
                "cwnd".to_string(),
                [(
                    "f1".to_string(),
                    Flow {
                        datasets: vec![Dataset::default()],
                        ..Flow::default()
                    },
                )]
                .into_iter()
                .collect(),
            )]
            .into_iter()
            .collect(),
        );
        state
            .mappings
            .add(AxisMapping::new("cwnd", "f1", 1), &state.catalog, 2)
            .unwrap();

        let entries = vec![GraphDataEntry {
            map: 0,
            plot: vec![[[0.0, 1.0]].into_iter().collect()],
        }];
        ViewService::apply_graph_data(&mut state, &entries, &mut sink);

        assert_eq!(sink.series_per_graph[0], 0);
        assert_eq!(sink.series_per_graph[1], 1);

        ViewService::resize_graphs(&mut state, 1, &mut sink);
        assert_eq!(sink.series_per_graph.len(), 1);
    }
}
