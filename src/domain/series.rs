// Scaled, coloured series attached to a graph
use super::catalog::Dataset;
use super::colour::Rgb;

/// Largest value seen on each axis of a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Maxima {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Maxima {
    /// Scan every sample; maxima start at zero and 2-tuples leave z at zero
    pub fn of(dataset: &Dataset) -> Self {
        dataset.samples().iter().fold(Maxima::default(), |acc, sample| Maxima {
            x: sample.x().map_or(acc.x, |x| acc.x.max(x)),
            y: sample.y().map_or(acc.y, |y| acc.y.max(y)),
            z: sample.z().map_or(acc.z, |z| acc.z.max(z)),
        })
    }

    pub fn merge(self, other: Maxima) -> Maxima {
        Maxima {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
            z: self.z.max(other.z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Scale {
    pub const UNIT: Scale = Scale {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Index of the mapping this series was produced from
    pub mapping: usize,
    pub flow: String,
    pub points: Dataset,
    pub scale: Scale,
    pub colour: Rgb,
}
