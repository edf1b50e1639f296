// Session-stable flow colours and legend labels
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const DEFAULT_PALETTE: [Rgb; 10] = [
    Rgb::new(0xf4, 0x43, 0x36),
    Rgb::new(0x3f, 0x51, 0xb5),
    Rgb::new(0x4c, 0xaf, 0x50),
    Rgb::new(0xff, 0x98, 0x00),
    Rgb::new(0x21, 0x96, 0xf3),
    Rgb::new(0x00, 0x96, 0x88),
    Rgb::new(0xff, 0xeb, 0x3b),
    Rgb::new(0x00, 0xbc, 0xd4),
    Rgb::new(0xcd, 0xdc, 0x39),
    Rgb::new(0x60, 0x7d, 0x8b),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Palette(Vec<Rgb>);

impl Palette {
    pub const MIN_LEN: usize = 10;

    /// Palettes shorter than `MIN_LEN` are rejected
    pub fn new(colours: Vec<Rgb>) -> Option<Self> {
        (colours.len() >= Self::MIN_LEN).then_some(Self(colours))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Wraps around once there are more flows than colours
    pub fn pick(&self, position: usize) -> Rgb {
        self.0[position % self.0.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_PALETTE.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColourAssignment {
    pub flow: String,
    pub colour: Rgb,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub index: usize,
    pub flow: String,
    pub colour: Rgb,
    pub label: String,
}

/// Append-only flow -> colour assignments, in order of first appearance
#[derive(Debug, Clone, Default)]
pub struct ColourAssigner {
    palette: Palette,
    assignments: Vec<ColourAssignment>,
    labels: Vec<String>,
}

impl ColourAssigner {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            assignments: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn colour_for(&mut self, flow: &str) -> Rgb {
        if let Some(existing) = self.assignment(flow) {
            return existing.colour;
        }

        let index = self.assignments.len();
        let colour = self.palette.pick(index);
        tracing::debug!("Assigned colour {} to flow {} (index {})", colour.to_hex(), flow, index);
        self.assignments.push(ColourAssignment {
            flow: flow.to_string(),
            colour,
            index,
        });
        colour
    }

    pub fn assignment(&self, flow: &str) -> Option<&ColourAssignment> {
        self.assignments.iter().find(|a| a.flow == flow)
    }

    pub fn set_label(&mut self, index: usize, label: impl Into<String>) {
        if self.labels.len() <= index {
            self.labels.resize(index + 1, String::new());
        }
        self.labels[index] = label.into();
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }

    /// Labels padded with empty entries up to the number of assigned flows
    pub fn labels(&self) -> Vec<String> {
        let mut labels = self.labels.clone();
        if labels.len() < self.assignments.len() {
            labels.resize(self.assignments.len(), String::new());
        }
        labels
    }

    /// User label if set, otherwise the zero-based index
    pub fn display_name(&self, index: usize) -> String {
        match self.labels.get(index) {
            Some(label) if !label.is_empty() => label.clone(),
            _ => index.to_string(),
        }
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.assignments
            .iter()
            .map(|a| LegendEntry {
                index: a.index,
                flow: a.flow.clone(),
                colour: a.colour,
                label: self.display_name(a.index),
            })
            .collect()
    }
}
