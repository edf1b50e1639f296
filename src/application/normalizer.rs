// Normalizer - shared axis ranges and per-series scale factors
use crate::application::data_source::GraphDataEntry;
use crate::domain::catalog::Dataset;
use crate::domain::graph::{Extents, GraphRegistry};
use crate::domain::mapping::MappingTable;
use crate::domain::metric::MetricRef;
use crate::domain::series::{Maxima, Scale};
use crate::error::PipelineError;
use std::collections::BTreeMap;

/// A fetched series with its scale factors, not yet coloured
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledSeries {
    pub mapping: usize,
    pub graph: usize,
    pub flow: String,
    pub points: Dataset,
    pub maxima: Maxima,
    pub scale: Scale,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalization {
    /// In mapping order
    pub series: Vec<ScaledSeries>,
    /// New axis label ranges for graphs that received at least one series
    pub label_ranges: BTreeMap<usize, Extents>,
    /// Largest x value across every graph
    pub highest_time: f64,
    /// Per-mapping failures; the rest of the batch is unaffected
    pub skipped: Vec<PipelineError>,
}

/// Axes that carry no data, or whose range collapsed to zero, are left unscaled
fn axis_scale(limit: f64, range: f64, role: &MetricRef) -> f64 {
    if *role == MetricRef::Nothing || range <= 0.0 {
        1.0
    } else {
        limit / range
    }
}

/// Pair every mapping with its fetched data and derive scale factors.
///
/// Y and Z ranges are per graph; the X range is shared by all graphs so that time axes
/// stay comparable during synchronized playback.
pub fn normalize(
    entries: &[GraphDataEntry],
    mappings: &MappingTable,
    graphs: &GraphRegistry,
) -> Normalization {
    let mut outcome = Normalization::default();

    let mut by_mapping: BTreeMap<usize, &GraphDataEntry> = BTreeMap::new();
    for entry in entries {
        if mappings.get(entry.map).is_none() {
            tracing::warn!("Ignoring graph data for unknown mapping {}", entry.map);
            continue;
        }
        if by_mapping.insert(entry.map, entry).is_some() {
            tracing::warn!("Duplicate graph data for mapping {}, keeping the last", entry.map);
        }
    }

    // Pass 1: local maxima, grouped by graph
    let mut found = Vec::new();
    let mut graph_maxima: BTreeMap<usize, Maxima> = BTreeMap::new();
    let mut highest_time = 0.0_f64;

    for (index, mapping) in mappings.iter().enumerate() {
        let Some(dataset) = by_mapping.get(&index).and_then(|entry| entry.dataset()) else {
            tracing::warn!(
                "No data returned for mapping {} ({}/{})",
                index,
                mapping.metric,
                mapping.flow
            );
            outcome.skipped.push(PipelineError::MissingSeriesData {
                mapping: index,
                metric: mapping.metric.to_string(),
                flow: mapping.flow.clone(),
                dataset: mapping.dataset,
            });
            continue;
        };

        if graphs.get(mapping.graph).is_none() {
            outcome.skipped.push(PipelineError::InvalidMapping(format!(
                "mapping {} targets missing graph {}",
                index, mapping.graph
            )));
            continue;
        }

        let maxima = Maxima::of(dataset);
        highest_time = highest_time.max(maxima.x);
        graph_maxima
            .entry(mapping.graph)
            .and_modify(|m| *m = m.merge(maxima))
            .or_insert(maxima);
        found.push((index, mapping, dataset, maxima));
    }

    // Pass 2: axis label ranges for every graph with data
    for (&graph_index, maxima) in &graph_maxima {
        if let Some(graph) = graphs.get(graph_index) {
            let mut range = graph.axis_label_range;
            range.x.max = highest_time;
            range.y.max = maxima.y;
            range.z.max = maxima.z;
            outcome.label_ranges.insert(graph_index, range);
        }
    }

    // Pass 3: scale factors against the graph's fixed limits
    for (index, mapping, dataset, maxima) in found {
        let (Some(graph), Some(range)) = (
            graphs.get(mapping.graph),
            outcome.label_ranges.get(&mapping.graph),
        ) else {
            continue;
        };

        let scale = Scale {
            x: axis_scale(graph.limits.x.max, range.x.max, &mapping.xaxis.metric),
            y: axis_scale(graph.limits.y.max, range.y.max, &mapping.metric),
            z: axis_scale(graph.limits.z.max, range.z.max, &mapping.zaxis.metric),
        };

        outcome.series.push(ScaledSeries {
            mapping: index,
            graph: mapping.graph,
            flow: mapping.flow.clone(),
            points: dataset.clone(),
            maxima,
            scale,
        });
    }

    outcome.highest_time = highest_time;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Catalog, CatalogPayload, Flow};
    use crate::domain::graph::GraphLayout;
    use crate::domain::mapping::{AxisMapping, AxisRef};
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn catalog(flows: &[&str]) -> Catalog {
        let mut payload = CatalogPayload::new();
        let metric_flows = flows
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
        payload.insert("cwnd".into(), metric_flows);
        let mut catalog = Catalog::new();
        catalog.replace(payload);
        catalog
    }

    fn registry(count: usize) -> GraphRegistry {
        let mut registry = GraphRegistry::new(GraphLayout::default());
        registry.resize(count);
        registry
    }

    fn entry(map: usize, points: Dataset) -> GraphDataEntry {
        GraphDataEntry {
            map,
            plot: vec![points],
        }
    }

    #[test]
    fn test_single_series_scenario() {
        let catalog = catalog(&["f1"]);
        let graphs = registry(1);
        let mut mappings = MappingTable::new();
        mappings.add(AxisMapping::new("cwnd", "f1", 0), &catalog, 1).unwrap();

        let entries = vec![entry(0, Dataset::from_iter([[0.0, 0.5], [5.0, 2.0], [10.0, 1.0]]))];
        let result = normalize(&entries, &mappings, &graphs);

        let range = result.label_ranges[&0];
        assert_eq!(range.x.max, 10.0);
        assert_eq!(range.y.max, 2.0);
        assert_eq!(result.series[0].scale.x, 10.0);
        assert_eq!(result.series[0].scale.y, 50.0);
        assert_eq!(result.series[0].scale.z, 1.0);
        assert_eq!(result.highest_time, 10.0);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_x_range_shared_across_graphs_y_per_graph() {
        let catalog = catalog(&["f1", "f2"]);
        let graphs = registry(2);
        let mut mappings = MappingTable::new();
        mappings.add(AxisMapping::new("cwnd", "f1", 0), &catalog, 2).unwrap();
        mappings.add(AxisMapping::new("cwnd", "f2", 1), &catalog, 2).unwrap();

        let entries = vec![
            entry(0, Dataset::from_iter([[20.0, 4.0]])),
            entry(1, Dataset::from_iter([[40.0, 25.0]])),
        ];
        let result = normalize(&entries, &mappings, &graphs);

        assert_eq!(result.label_ranges[&0].x.max, 40.0);
        assert_eq!(result.label_ranges[&1].x.max, 40.0);
        assert_eq!(result.label_ranges[&0].y.max, 4.0);
        assert_eq!(result.label_ranges[&1].y.max, 25.0);
        assert_eq!(result.series[0].scale.x, 2.5);
        assert_eq!(result.series[0].scale.y, 25.0);
        assert_eq!(result.series[1].scale.y, 4.0);
    }

    #[test]
    fn test_partial_failure_skips_only_missing_mapping() {
        let catalog = catalog(&["f1", "f2", "f3"]);
        let graphs = registry(1);
        let mut mappings = MappingTable::new();
        for flow in ["f1", "f2", "f3"] {
            mappings.add(AxisMapping::new("cwnd", flow, 0), &catalog, 1).unwrap();
        }

        let entries = vec![
            entry(0, Dataset::from_iter([[1.0, 1.0]])),
            entry(2, Dataset::from_iter([[2.0, 3.0]])),
        ];
        let result = normalize(&entries, &mappings, &graphs);

        let plotted: Vec<usize> = result.series.iter().map(|s| s.mapping).collect();
        assert_eq!(plotted, vec![0, 2]);
        assert_eq!(result.skipped.len(), 1);
        assert!(matches!(
            &result.skipped[0],
            PipelineError::MissingSeriesData { mapping: 1, flow, .. } if flow == "f2"
        ));
    }

    #[test]
    fn test_duplicate_entries_keep_the_last() {
        let catalog = catalog(&["f1"]);
        let graphs = registry(1);
        let mut mappings = MappingTable::new();
        mappings.add(AxisMapping::new("cwnd", "f1", 0), &catalog, 1).unwrap();

        let entries = vec![
            entry(0, Dataset::from_iter([[40.0, 8.0]])),
            entry(0, Dataset::from_iter([[20.0, 4.0]])),
        ];
        let result = normalize(&entries, &mappings, &graphs);

        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series[0].maxima.x, 20.0);
        assert_eq!(result.label_ranges[&0].y.max, 4.0);
    }

    #[test]
    fn test_empty_plot_counts_as_missing() {
        let catalog = catalog(&["f1"]);
        let graphs = registry(1);
        let mut mappings = MappingTable::new();
        mappings.add(AxisMapping::new("cwnd", "f1", 0), &catalog, 1).unwrap();

        let entries = vec![GraphDataEntry { map: 0, plot: vec![] }, entry(7, Dataset::default())];
        let result = normalize(&entries, &mappings, &graphs);

        assert!(result.series.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert!(result.label_ranges.is_empty());
    }

    #[test]
    fn test_zero_range_and_nothing_axis_scale_to_one() {
        let catalog = catalog(&["f1"]);
        let graphs = registry(1);
        let mut mappings = MappingTable::new();
        mappings
            .add(
                AxisMapping::new("cwnd", "f1", 0).with_zaxis(AxisRef::nothing()),
                &catalog,
                1,
            )
            .unwrap();

        let entries = vec![entry(0, Dataset::from_iter([[0.0, 0.0], [0.0, 0.0]]))];
        let result = normalize(&entries, &mappings, &graphs);

        assert_eq!(result.series[0].scale, Scale::UNIT);
    }

    #[test]
    fn test_z_axis_scaled_from_three_tuples() {
        let catalog = catalog(&["f1", "f2"]);
        let graphs = registry(1);
        let mut mappings = MappingTable::new();
        mappings
            .add(
                AxisMapping::new("cwnd", "f1", 0).with_zaxis(AxisRef::series("cwnd", "f2", 0)),
                &catalog,
                1,
            )
            .unwrap();

        let entries = vec![entry(0, Dataset::from_iter([[1.0, 1.0, 4.0], [2.0, 2.0, 8.0]]))];
        let result = normalize(&entries, &mappings, &graphs);

        assert_eq!(result.label_ranges[&0].z.max, 8.0);
        assert_eq!(result.series[0].scale.z, 12.5);
    }

    fn points() -> impl Strategy<Value = Dataset> {
        prop::collection::vec((0.0f64..1e6, 0.0f64..1e6, 0.0f64..1e3), 1..20)
            .prop_map(|pts| pts.into_iter().map(|(x, y, z)| [x, y, z]).collect())
    }

    proptest! {
        #[test]
        fn test_no_series_overflows_its_graph(
            batch in prop::collection::vec((0usize..3, points()), 1..8)
        ) {
            let flows: Vec<String> = (0..batch.len()).map(|i| format!("f{}", i)).collect();
            let flow_refs: Vec<&str> = flows.iter().map(String::as_str).collect();
            let catalog = catalog(&flow_refs);
            let graphs = registry(3);
            let mut mappings = MappingTable::new();
            let mut entries = Vec::new();
            for (i, (graph, data)) in batch.into_iter().enumerate() {
                mappings
                    .add(
                        AxisMapping::new("cwnd", flows[i].clone(), graph)
                            .with_zaxis(AxisRef::series("cwnd", flows[i].clone(), 0)),
                        &catalog,
                        3,
                    )
                    .unwrap();
                entries.push(entry(i, data));
            }

            let result = normalize(&entries, &mappings, &graphs);

            for series in &result.series {
                let limits = graphs.get(series.graph).unwrap().limits;
                prop_assert!(series.scale.x * series.maxima.x <= limits.x.max + EPSILON * limits.x.max);
                prop_assert!(series.scale.y * series.maxima.y <= limits.y.max + EPSILON * limits.y.max);
                prop_assert!(series.scale.z * series.maxima.z <= limits.z.max + EPSILON * limits.z.max);
            }

            let again = normalize(&entries, &mappings, &graphs);
            prop_assert_eq!(again, result);
        }
    }
}
