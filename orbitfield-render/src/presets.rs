//! Built-in gradient presets.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::RenderError;
use crate::gradient::Interpolation;

/// The twelve built-in gradients. Discriminants are the wire indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientPreset {
    #[default]
    Grayscale = 0,
    Hot = 1,
    Cold = 2,
    Night = 3,
    Candy = 4,
    Geography = 5,
    Ion = 6,
    Thermal = 7,
    Polar = 8,
    Spectrum = 9,
    Jet = 10,
    Hues = 11,
}

struct PresetEntry {
    name: &'static str,
    interpolation: Interpolation,
    stops: &'static [(f64, Rgba)],
}

const fn c(r: u8, g: u8, b: u8) -> Rgba {
    Rgba::rgb(r, g, b)
}

use Interpolation::{Hsv, Rgb};

static PRESETS: [PresetEntry; 12] = [
    PresetEntry {
        name: "Grayscale",
        interpolation: Rgb,
        stops: &[(0.0, c(0, 0, 0)), (1.0, c(255, 255, 255))],
    },
    PresetEntry {
        name: "Hot",
        interpolation: Rgb,
        stops: &[
            (0.0, c(50, 0, 0)),
            (0.2, c(180, 10, 0)),
            (0.4, c(245, 50, 0)),
            (0.6, c(255, 150, 10)),
            (0.8, c(255, 255, 50)),
            (1.0, c(255, 255, 255)),
        ],
    },
    PresetEntry {
        name: "Cold",
        interpolation: Rgb,
        stops: &[
            (0.0, c(0, 0, 50)),
            (0.2, c(0, 10, 180)),
            (0.4, c(0, 50, 245)),
            (0.6, c(10, 150, 255)),
            (0.8, c(50, 255, 255)),
            (1.0, c(255, 255, 255)),
        ],
    },
    PresetEntry {
        name: "Night",
        interpolation: Hsv,
        stops: &[(0.0, c(10, 20, 30)), (1.0, c(250, 255, 250))],
    },
    PresetEntry {
        name: "Candy",
        interpolation: Hsv,
        stops: &[(0.0, c(0, 0, 255)), (1.0, c(255, 250, 250))],
    },
    PresetEntry {
        name: "Geography",
        interpolation: Rgb,
        stops: &[
            (0.0, c(70, 170, 210)),
            (0.2, c(90, 160, 180)),
            (0.25, c(45, 130, 175)),
            (0.3, c(100, 140, 125)),
            (0.5, c(100, 140, 100)),
            (0.6, c(130, 145, 120)),
            (0.7, c(140, 130, 120)),
            (0.9, c(180, 190, 190)),
            (1.0, c(210, 210, 230)),
        ],
    },
    PresetEntry {
        name: "Ion",
        interpolation: Hsv,
        stops: &[
            (0.0, c(50, 10, 10)),
            (0.45, c(0, 0, 255)),
            (0.8, c(0, 255, 255)),
            (1.0, c(0, 255, 0)),
        ],
    },
    PresetEntry {
        name: "Thermal",
        interpolation: Rgb,
        stops: &[
            (0.0, c(0, 0, 50)),
            (0.15, c(20, 0, 120)),
            (0.33, c(200, 30, 140)),
            (0.6, c(255, 100, 0)),
            (0.85, c(255, 255, 40)),
            (1.0, c(255, 255, 255)),
        ],
    },
    PresetEntry {
        name: "Polar",
        interpolation: Rgb,
        stops: &[
            (0.0, c(50, 255, 255)),
            (0.18, c(10, 70, 255)),
            (0.28, c(10, 10, 190)),
            (0.5, c(0, 0, 0)),
            (0.72, c(190, 10, 10)),
            (0.82, c(255, 70, 10)),
            (1.0, c(255, 255, 50)),
        ],
    },
    PresetEntry {
        name: "Spectrum",
        interpolation: Hsv,
        stops: &[
            (0.0, c(50, 0, 50)),
            (0.15, c(0, 0, 255)),
            (0.35, c(0, 255, 255)),
            (0.6, c(255, 255, 0)),
            (0.75, c(255, 30, 0)),
            (1.0, c(50, 0, 0)),
        ],
    },
    PresetEntry {
        name: "Jet",
        interpolation: Rgb,
        stops: &[
            (0.0, c(0, 0, 100)),
            (0.15, c(0, 50, 255)),
            (0.35, c(0, 255, 255)),
            (0.65, c(255, 255, 0)),
            (0.85, c(255, 30, 0)),
            (1.0, c(100, 0, 0)),
        ],
    },
    PresetEntry {
        name: "Hues",
        interpolation: Hsv,
        stops: &[
            (0.0, c(255, 0, 0)),
            (1.0 / 3.0, c(0, 0, 255)),
            (2.0 / 3.0, c(0, 255, 0)),
            (1.0, c(255, 0, 0)),
        ],
    },
];

impl GradientPreset {
    pub const ALL: [Self; 12] = [
        Self::Grayscale,
        Self::Hot,
        Self::Cold,
        Self::Night,
        Self::Candy,
        Self::Geography,
        Self::Ion,
        Self::Thermal,
        Self::Polar,
        Self::Spectrum,
        Self::Jet,
        Self::Hues,
    ];

    fn entry(self) -> &'static PresetEntry {
        &PRESETS[self as usize]
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn interpolation(self) -> Interpolation {
        self.entry().interpolation
    }

    pub fn stops(self) -> &'static [(f64, Rgba)] {
        self.entry().stops
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<u32> for GradientPreset {
    type Error = RenderError;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(RenderError::UnknownPreset(index))
    }
}

impl std::fmt::Display for GradientPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
