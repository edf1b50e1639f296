// Saved view descriptions: the server's default view and the exported command line
use serde::Deserialize;
use std::fmt;

/// View preset served by the experiment server on start-up
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DefaultView {
    #[serde(default)]
    pub test_id: Vec<String>,
    #[serde(default)]
    pub source_filter: String,
    #[serde(default)]
    pub metric: Vec<String>,
    #[serde(default)]
    pub lnames: Vec<String>,
    #[serde(default = "default_graph_count")]
    pub graph_count: usize,
    #[serde(default)]
    pub graph_names: Vec<String>,
    #[serde(default)]
    pub stime: f64,
    #[serde(default)]
    pub etime: f64,
}

fn default_graph_count() -> usize {
    1
}

/// Snapshot of the current view, rendered as the command that reproduces it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewExport {
    pub metrics: Vec<String>,
    pub test_ids: Vec<String>,
    pub source_filter: String,
    pub lnames: Vec<String>,
    pub graph_names: Vec<String>,
    pub stime: f64,
    pub etime: f64,
}

impl fmt::Display for ViewExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fab animate:metric=\"{}\",test_id=\"{}\",source_filter=\"{}\",lnames=\"{}\",graph_count=\"{}\",graph_names=\"{}\",etime=\"{}\",stime=\"{}\"",
            self.metrics.join(";"),
            self.test_ids.join(";"),
            self.source_filter,
            self.lnames.join(";"),
            self.graph_names.len(),
            self.graph_names.join(";"),
            js_number(self.etime),
            js_number(self.stime),
        )
    }
}

/// Shortest round-trip digits as a browser prints numbers: no negative zero, and
/// exponent form below 1e-6 or from 1e21 up
fn js_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) || value.is_nan() {
        return value.to_string();
    }

    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}
