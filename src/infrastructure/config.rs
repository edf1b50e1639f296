use crate::domain::colour::{Palette, Rgb};
use crate::domain::graph::{Extents, GraphLayout, Vec3};
use crate::domain::metric::MetricScales;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TeaplotConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub graph: GraphSettings,
    /// Per-metric overrides merged over the built-in scales
    #[serde(default)]
    pub scales: BTreeMap<String, f64>,
    #[serde(default)]
    pub palette: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphSettings {
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default)]
    pub origin: OriginSettings,
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    #[serde(default = "default_initial_count")]
    pub initial_count: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            limits: LimitSettings::default(),
            origin: OriginSettings::default(),
            spacing: default_spacing(),
            initial_count: default_initial_count(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitSettings {
    #[serde(default = "default_limit")]
    pub x: f64,
    #[serde(default = "default_limit")]
    pub y: f64,
    #[serde(default = "default_limit")]
    pub z: f64,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            x: default_limit(),
            y: default_limit(),
            z: default_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OriginSettings {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_spacing() -> f64 {
    150.0
}

fn default_initial_count() -> usize {
    1
}

fn default_limit() -> f64 {
    100.0
}

impl TeaplotConfig {
    /// Configured palette; falls back to the built-in one when fewer than ten colours are given
    pub fn palette(&self) -> anyhow::Result<Palette> {
        if self.palette.is_empty() {
            return Ok(Palette::default());
        }

        let colours = self
            .palette
            .iter()
            .map(|hex| Rgb::from_hex(hex).with_context(|| format!("Invalid palette colour {}", hex)))
            .collect::<anyhow::Result<Vec<_>>>()?;

        match Palette::new(colours) {
            Some(palette) => Ok(palette),
            None => {
                tracing::warn!(
                    "Palette needs at least {} colours, using the default",
                    Palette::MIN_LEN
                );
                Ok(Palette::default())
            }
        }
    }

    pub fn scales(&self) -> MetricScales {
        let mut scales = MetricScales::default();
        for (metric, scale) in &self.scales {
            scales.set(metric.as_str(), *scale);
        }
        scales
    }

    pub fn graph_layout(&self) -> GraphLayout {
        let limits = &self.graph.limits;
        let origin = &self.graph.origin;
        GraphLayout {
            origin: Vec3::new(origin.x, origin.y, origin.z),
            spacing: self.graph.spacing,
            limits: Extents::new(limits.x, limits.y, limits.z),
            ..GraphLayout::default()
        }
    }
}

/// Load `config/teaplot.toml` if present, overlaid by `TEAPLOT__SECTION__KEY` variables
pub fn load_config() -> anyhow::Result<TeaplotConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/teaplot").required(false))
        .add_source(config::Environment::with_prefix("TEAPLOT").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
fn load_config_str(toml: &str) -> anyhow::Result<TeaplotConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}
