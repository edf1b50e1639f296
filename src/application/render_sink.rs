// Rendering surface the pipeline feeds; implemented outside the core
use crate::domain::colour::LegendEntry;
use crate::domain::graph::{Axis, Extents, Graph};
use crate::domain::series::Series;
use crate::domain::window::ViewWindow;

pub trait RenderSink: Send {
    fn add_graph(&mut self, graph: &Graph);

    /// The graph and all of its series are gone
    fn remove_graph(&mut self, graph: usize);

    fn clear_series(&mut self, graph: usize);

    fn add_series(&mut self, graph: usize, series: &Series);

    fn set_axis_label(&mut self, graph: usize, axis: Axis, metric: &str);

    /// Real-world values the axes of a graph now represent
    fn set_display_range(&mut self, graph: usize, range: &Extents);

    fn set_graph_name(&mut self, graph: usize, name: &str);

    /// Visible percentage window, applied to every graph
    fn set_visible_window(&mut self, window: &ViewWindow);

    fn set_legend(&mut self, legend: &[LegendEntry]);
}
