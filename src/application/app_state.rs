// Application state - the single value every pipeline stage reads and mutates
use crate::domain::catalog::Catalog;
use crate::domain::colour::{ColourAssigner, Palette};
use crate::domain::graph::{GraphLayout, GraphRegistry};
use crate::domain::mapping::MappingTable;
use crate::domain::metric::MetricScales;
use crate::domain::view::ViewExport;
use crate::domain::window::{TimeWindow, ViewWindow};

/// Ordered set of selected names; selection order is preserved for exports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection(Vec<String>);

impl Selection {
    pub fn from_vec(items: Vec<String>) -> Self {
        let mut selection = Self::default();
        for item in items {
            selection.select(item);
        }
        selection
    }

    /// Returns false if the name was already selected
    pub fn select(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.contains(&item) {
            return false;
        }
        self.0.push(item);
        true
    }

    pub fn deselect(&mut self, item: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|i| i != item);
        self.0.len() != before
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.iter().any(|i| i == item)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub experiments: Selection,
    pub metrics: Selection,
    pub source_filter: String,
    pub scales: MetricScales,
    pub available_metrics: Vec<String>,
    pub available_experiments: Vec<String>,
    pub catalog: Catalog,
    pub mappings: MappingTable,
    pub graphs: GraphRegistry,
    pub colours: ColourAssigner,
    pub time_window: TimeWindow,
    pub view_window: ViewWindow,
    /// Largest time value in the current view, zero until data has been drawn
    pub highest_time: f64,
}

impl AppState {
    pub fn new(layout: GraphLayout, scales: MetricScales, palette: Palette) -> Self {
        Self {
            experiments: Selection::default(),
            metrics: Selection::default(),
            source_filter: String::new(),
            scales,
            available_metrics: Vec::new(),
            available_experiments: Vec::new(),
            catalog: Catalog::new(),
            mappings: MappingTable::new(),
            graphs: GraphRegistry::new(layout),
            colours: ColourAssigner::new(palette),
            time_window: TimeWindow::default(),
            view_window: ViewWindow::default(),
            highest_time: 0.0,
        }
    }

    pub fn export(&self) -> ViewExport {
        ViewExport {
            metrics: self.metrics.as_slice().to_vec(),
            test_ids: self.experiments.as_slice().to_vec(),
            source_filter: self.source_filter.clone(),
            lnames: self.colours.labels(),
            graph_names: self.graphs.names().into_iter().map(str::to_string).collect(),
            stime: self.time_window.stime,
            etime: self.time_window.etime,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(GraphLayout::default(), MetricScales::default(), Palette::default())
    }
}
