// Mapping table - user-authored bindings of metric/flow data onto graph axes
use super::catalog::Catalog;
use super::metric::{MetricRef, MetricScales};
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Data source for one axis: a pseudo-metric or a (metric, flow, dataset) triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRef {
    pub metric: MetricRef,
    #[serde(default)]
    pub flow: String,
    #[serde(default)]
    pub dataset: usize,
}

impl AxisRef {
    pub fn time() -> Self {
        Self::pseudo(MetricRef::Time)
    }

    pub fn nothing() -> Self {
        Self::pseudo(MetricRef::Nothing)
    }

    fn pseudo(metric: MetricRef) -> Self {
        Self {
            metric,
            flow: String::new(),
            dataset: 0,
        }
    }

    pub fn series(metric: impl Into<String>, flow: impl Into<String>, dataset: usize) -> Self {
        Self {
            metric: MetricRef::named(metric),
            flow: flow.into(),
            dataset,
        }
    }

    /// Check the reference against the catalog; pseudo-metrics always resolve
    fn validate(&self, catalog: &Catalog) -> Result<(), String> {
        let MetricRef::Named(metric) = &self.metric else {
            return Ok(());
        };
        if !catalog.contains_metric(metric) {
            return Err(format!("unknown metric '{}'", metric));
        }
        if self.flow.is_empty() {
            return Err(format!("metric '{}' requires a flow", metric));
        }
        let flow = catalog
            .flow(metric, &self.flow)
            .ok_or_else(|| format!("unknown flow '{}' for metric '{}'", self.flow, metric))?;
        if flow.dataset(self.dataset).is_none() {
            return Err(format!(
                "dataset {} out of range for {}/{} ({} datasets)",
                self.dataset,
                metric,
                self.flow,
                flow.datasets.len()
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisMapping {
    /// Y-axis metric
    pub metric: MetricRef,
    #[serde(default)]
    pub flow: String,
    #[serde(default)]
    pub graph: usize,
    #[serde(default)]
    pub dataset: usize,
    #[serde(default = "AxisRef::time")]
    pub xaxis: AxisRef,
    #[serde(default = "AxisRef::nothing")]
    pub zaxis: AxisRef,
}

impl AxisMapping {
    /// Y data from `metric`/`flow` dataset 0 against time, no Z axis
    pub fn new(metric: impl Into<String>, flow: impl Into<String>, graph: usize) -> Self {
        Self {
            metric: MetricRef::named(metric),
            flow: flow.into(),
            graph,
            dataset: 0,
            xaxis: AxisRef::time(),
            zaxis: AxisRef::nothing(),
        }
    }

    pub fn with_dataset(mut self, dataset: usize) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn with_xaxis(mut self, xaxis: AxisRef) -> Self {
        self.xaxis = xaxis;
        self
    }

    pub fn with_zaxis(mut self, zaxis: AxisRef) -> Self {
        self.zaxis = zaxis;
        self
    }

    pub fn yaxis(&self) -> AxisRef {
        AxisRef {
            metric: self.metric.clone(),
            flow: self.flow.clone(),
            dataset: self.dataset,
        }
    }

    pub fn validate(&self, catalog: &Catalog, graph_count: usize) -> Result<(), String> {
        if self.graph >= graph_count {
            return Err(format!(
                "graph {} does not exist ({} graphs)",
                self.graph, graph_count
            ));
        }
        self.yaxis().validate(catalog).map_err(|e| format!("y axis: {}", e))?;
        self.xaxis.validate(catalog).map_err(|e| format!("x axis: {}", e))?;
        self.zaxis.validate(catalog).map_err(|e| format!("z axis: {}", e))?;
        Ok(())
    }
}

/// Per-axis part of a graph data request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisRequest {
    pub metric: String,
    pub dataset: usize,
    pub file: String,
    pub scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
}

/// Everything the server needs to produce the series of one mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRequest {
    pub map: usize,
    pub x: AxisRequest,
    pub y: AxisRequest,
    pub z: AxisRequest,
}

/// A mapping dropped because the data it referenced went away
#[derive(Debug, Clone, PartialEq)]
pub struct StaleMapping {
    pub index: usize,
    pub mapping: AxisMapping,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: Vec<AxisMapping>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AxisMapping> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxisMapping> {
        self.entries.iter()
    }

    /// Validate and append; on rejection the table is left untouched
    pub fn add(
        &mut self,
        entry: AxisMapping,
        catalog: &Catalog,
        graph_count: usize,
    ) -> Result<usize, PipelineError> {
        entry
            .validate(catalog, graph_count)
            .map_err(PipelineError::InvalidMapping)?;
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Option<AxisMapping> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every mapping that no longer validates against the catalog and registry
    pub fn prune_stale(&mut self, catalog: &Catalog, graph_count: usize) -> Vec<StaleMapping> {
        let mut stale = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());

        for (index, mapping) in self.entries.drain(..).enumerate() {
            match mapping.validate(catalog, graph_count) {
                Ok(()) => kept.push(mapping),
                Err(reason) => stale.push(StaleMapping {
                    index,
                    mapping,
                    reason,
                }),
            }
        }

        self.entries = kept;
        stale
    }

    /// One request per mapping, carrying each metric's display scale
    pub fn build_view_request(
        &self,
        catalog: &Catalog,
        scales: &MetricScales,
    ) -> Result<Vec<SeriesRequest>, PipelineError> {
        self.entries
            .iter()
            .enumerate()
            .map(|(map, mapping)| -> Result<SeriesRequest, PipelineError> {
                let mut y = axis_request(&mapping.yaxis(), catalog, scales)?;
                y.group = match &mapping.metric {
                    MetricRef::Named(metric) => {
                        catalog.flow(metric, &mapping.flow).map(|flow| flow.group)
                    }
                    _ => None,
                };
                Ok(SeriesRequest {
                    map,
                    x: axis_request(&mapping.xaxis, catalog, scales)?,
                    y,
                    z: axis_request(&mapping.zaxis, catalog, scales)?,
                })
            })
            .collect()
    }
}

fn axis_request(
    axis: &AxisRef,
    catalog: &Catalog,
    scales: &MetricScales,
) -> Result<AxisRequest, PipelineError> {
    let file = match &axis.metric {
        MetricRef::Named(metric) => catalog
            .flow(metric, &axis.flow)
            .map(|flow| flow.file.clone())
            .ok_or_else(|| {
                PipelineError::InvalidMapping(format!(
                    "no catalog entry for {}/{}",
                    metric, axis.flow
                ))
            })?,
        pseudo => pseudo.as_str().to_string(),
    };

    Ok(AxisRequest {
        metric: axis.metric.as_str().to_string(),
        dataset: axis.dataset,
        file,
        scale: scales.scale_for(&axis.metric),
        group: None,
    })
}
