// Metric/flow catalog - the data sources available for mapping
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw sample, `[x, y]` or `[x, y, z]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(pub Vec<f64>);

impl Sample {
    pub fn x(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub fn y(&self) -> Option<f64> {
        self.0.get(1).copied()
    }

    /// Only 3-tuples carry a z value
    pub fn z(&self) -> Option<f64> {
        if self.0.len() == 3 { self.0.get(2).copied() } else { None }
    }
}

impl From<[f64; 2]> for Sample {
    fn from(value: [f64; 2]) -> Self {
        Sample(value.to_vec())
    }
}

impl From<[f64; 3]> for Sample {
    fn from(value: [f64; 3]) -> Self {
        Sample(value.to_vec())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(pub Vec<Sample>);

impl Dataset {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.0
    }
}

impl<S: Into<Sample>> FromIterator<S> for Dataset {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Dataset(iter.into_iter().map(Into::into).collect())
    }
}

/// A single network flow within a metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Filled in from the payload key
    #[serde(skip)]
    pub name: String,
    /// Server-side data file, echoed back in graph requests
    #[serde(default, rename = "filename")]
    pub file: String,
    #[serde(default)]
    pub group: u32,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl Flow {
    pub fn dataset(&self, index: usize) -> Option<&Dataset> {
        self.datasets.get(index)
    }
}

/// Wire shape of a metric data source response: metric -> flow -> flow record
pub type CatalogPayload = BTreeMap<String, BTreeMap<String, Flow>>;

/// What a catalog refresh removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneReport {
    pub metrics: Vec<String>,
    pub flows: Vec<(String, String)>,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.flows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    metrics: BTreeMap<String, BTreeMap<String, Flow>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog with a fresh response, pruning anything the response no longer lists
    pub fn replace(&mut self, payload: CatalogPayload) -> PruneReport {
        let mut report = PruneReport::default();

        for (metric, flows) in &self.metrics {
            match payload.get(metric) {
                None => {
                    report.metrics.push(metric.clone());
                    report
                        .flows
                        .extend(flows.keys().map(|flow| (metric.clone(), flow.clone())));
                }
                Some(fresh) => report.flows.extend(
                    flows
                        .keys()
                        .filter(|flow| !fresh.contains_key(*flow))
                        .map(|flow| (metric.clone(), flow.clone())),
                ),
            }
        }

        self.metrics = payload
            .into_iter()
            .map(|(metric, flows)| {
                let flows = flows
                    .into_iter()
                    .map(|(name, mut flow)| {
                        flow.name = name.clone();
                        (name, flow)
                    })
                    .collect();
                (metric, flows)
            })
            .collect();

        report
    }

    pub fn contains_metric(&self, metric: &str) -> bool {
        self.metrics.contains_key(metric)
    }

    pub fn flow(&self, metric: &str, flow: &str) -> Option<&Flow> {
        self.metrics.get(metric)?.get(flow)
    }

    pub fn dataset(&self, metric: &str, flow: &str, dataset: usize) -> Option<&Dataset> {
        self.flow(metric, flow)?.dataset(dataset)
    }

    /// Every (metric, flow) pair, metrics and flows both in lexical order
    pub fn series_keys(&self) -> Vec<(String, String)> {
        self.metrics
            .iter()
            .flat_map(|(metric, flows)| {
                flows.keys().map(move |flow| (metric.clone(), flow.clone()))
            })
            .collect()
    }
}
