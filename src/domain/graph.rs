// Graph targets and the resizable graph registry
use super::series::Series;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Per-axis ranges, used both for fixed display limits and for real-world label ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl Extents {
    pub fn uniform(max: f64) -> Self {
        Self::new(max, max, max)
    }

    pub fn new(x_max: f64, y_max: f64, z_max: f64) -> Self {
        Self {
            x: AxisRange::new(0.0, x_max),
            y: AxisRange::new(0.0, y_max),
            z: AxisRange::new(0.0, z_max),
        }
    }
}

impl Default for Extents {
    fn default() -> Self {
        Self::uniform(100.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Placement and extents applied to newly created graphs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphLayout {
    pub origin: Vec3,
    pub spacing: f64,
    pub limits: Extents,
    pub axis_sections: u32,
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self {
            origin: Vec3::default(),
            spacing: 150.0,
            limits: Extents::default(),
            axis_sections: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub id: usize,
    pub name: String,
    pub origin: Vec3,
    pub limits: Extents,
    /// Real-world maximum each axis represents, derived from data
    pub axis_label_range: Extents,
    pub axis_sections: [u32; 3],
    pub axis_labels: [String; 3],
    series: Vec<Series>,
}

impl Graph {
    fn new(id: usize, origin: Vec3, layout: &GraphLayout) -> Self {
        Self {
            id,
            name: String::new(),
            origin,
            limits: layout.limits,
            axis_label_range: Extents::uniform(0.0),
            axis_sections: [layout.axis_sections; 3],
            axis_labels: Default::default(),
            series: Vec::new(),
        }
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn clear_series(&mut self) {
        self.series.clear();
    }

    pub fn axis_label(&self, axis: Axis) -> &str {
        &self.axis_labels[axis as usize]
    }

    pub fn set_axis_label(&mut self, axis: Axis, label: impl Into<String>) {
        self.axis_labels[axis as usize] = label.into();
    }
}

/// Graphs added and removed by a registry resize
#[derive(Debug, Default)]
pub struct ResizeOutcome {
    pub added: Vec<usize>,
    pub removed: Vec<Graph>,
}

#[derive(Debug, Clone)]
pub struct GraphRegistry {
    graphs: Vec<Graph>,
    layout: GraphLayout,
}

impl GraphRegistry {
    pub fn new(layout: GraphLayout) -> Self {
        Self {
            graphs: Vec::new(),
            layout,
        }
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Graph> {
        self.graphs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Graph> {
        self.graphs.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Graph> {
        self.graphs.iter_mut()
    }

    /// Shrinking destroys trailing graphs with their series; growing stacks new graphs
    /// below the current last one
    pub fn resize(&mut self, count: usize) -> ResizeOutcome {
        let mut outcome = ResizeOutcome::default();

        while self.graphs.len() > count {
            if let Some(graph) = self.graphs.pop() {
                outcome.removed.push(graph);
            }
        }

        while self.graphs.len() < count {
            let origin = match self.graphs.last() {
                Some(last) => Vec3::new(
                    last.origin.x,
                    last.origin.y + last.limits.y.span() + self.layout.spacing,
                    0.0,
                ),
                None => self.layout.origin,
            };
            let id = self.graphs.len();
            self.graphs.push(Graph::new(id, origin, &self.layout));
            outcome.added.push(id);
        }

        outcome
    }

    pub fn names(&self) -> Vec<&str> {
        self.graphs.iter().map(|g| g.name.as_str()).collect()
    }
}
