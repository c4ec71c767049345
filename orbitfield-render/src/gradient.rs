use std::collections::BTreeMap;
use std::sync::OnceLock;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::RenderBuffer;
use crate::color::{wrap_unit, Hsv, Rgba};
use crate::presets::GradientPreset;
use crate::scalar_field::ScalarField;

// ---------------------------------------------------------------------------
// Stops
// ---------------------------------------------------------------------------

/// Position of a stop on the unit interval.
///
/// The complement `1 − p` is computed once and carried along, so a position
/// reads back exactly as set and inverting twice restores it bit for bit.
/// Ordering and equality look at the position only.
#[derive(Debug, Clone, Copy)]
pub struct StopPosition {
    value: f64,
    complement: f64,
}

impl StopPosition {
    /// Clamp `p` into `[0, 1]` (NaN maps to 0).
    pub fn new(p: f64) -> Self {
        // `+ 0.0` folds −0 into +0.
        let value = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) + 0.0 };
        Self {
            value,
            complement: 1.0 - value,
        }
    }

    pub fn value(self) -> f64 {
        self.value
    }

    pub fn inverted(self) -> Self {
        Self {
            value: self.complement,
            complement: self.value,
        }
    }
}

impl PartialEq for StopPosition {
    fn eq(&self, other: &Self) -> bool {
        self.value.to_bits() == other.value.to_bits()
    }
}

impl Eq for StopPosition {}

impl PartialOrd for StopPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StopPosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl std::hash::Hash for StopPosition {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
    }
}

/// How colors between two stops are blended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Rgb,
    /// Saturation and value linearly, hue along the shorter arc.
    Hsv,
}

// ---------------------------------------------------------------------------
// Gradient
// ---------------------------------------------------------------------------

/// Ordered color stops plus a lazily built lookup table of `level_count`
/// entries.
///
/// Setters only drop the table; it is rebuilt on the next lookup. Equality
/// ignores the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "GradientConfig", into = "GradientConfig")]
pub struct ColorGradient {
    stops: BTreeMap<StopPosition, Rgba>,
    interpolation: Interpolation,
    periodic: bool,
    level_count: usize,
    lut: OnceLock<Vec<Rgba>>,
}

impl ColorGradient {
    pub const DEFAULT_LEVEL_COUNT: usize = 350;
    pub const MIN_LEVEL_COUNT: usize = 2;

    /// A gradient with no stops (every lookup yields opaque black).
    pub fn new() -> Self {
        Self {
            stops: BTreeMap::new(),
            interpolation: Interpolation::default(),
            periodic: false,
            level_count: Self::DEFAULT_LEVEL_COUNT,
            lut: OnceLock::new(),
        }
    }

    pub fn from_preset(preset: GradientPreset) -> Self {
        let mut g = Self::new();
        g.set_interpolation(preset.interpolation());
        g.set_stops(preset.stops().iter().copied());
        g
    }

    // -- Setters (invalidate the table) --

    /// Replace every stop. Later duplicates of a position win.
    pub fn set_stops(&mut self, stops: impl IntoIterator<Item = (f64, Rgba)>) {
        self.stops = stops
            .into_iter()
            .map(|(p, c)| (StopPosition::new(p), c))
            .collect();
        self.invalidate();
    }

    /// Insert or overwrite the stop at `position`.
    pub fn set_stop_at(&mut self, position: f64, color: Rgba) {
        self.stops.insert(StopPosition::new(position), color);
        self.invalidate();
    }

    pub fn clear_stops(&mut self) {
        self.stops.clear();
        self.invalidate();
    }

    pub fn set_interpolation(&mut self, mode: Interpolation) {
        self.interpolation = mode;
        self.invalidate();
    }

    pub fn set_periodic(&mut self, periodic: bool) {
        self.periodic = periodic;
        self.invalidate();
    }

    /// Values below 2 are raised to 2.
    pub fn set_level_count(&mut self, n: usize) {
        let clamped = n.max(Self::MIN_LEVEL_COUNT);
        if clamped != n {
            debug!(requested = n, level_count = clamped, "Level count clamped");
        }
        self.level_count = clamped;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.lut = OnceLock::new();
    }

    // -- Getters --

    pub fn stops(&self) -> impl Iterator<Item = (f64, Rgba)> + '_ {
        self.stops.iter().map(|(p, c)| (p.value(), *c))
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    /// Whether the lookup table is currently built.
    pub fn is_built(&self) -> bool {
        self.lut.get().is_some()
    }

    /// The same gradient with every stop moved to `1 − position`.
    pub fn inverted(&self) -> Self {
        Self {
            stops: self
                .stops
                .iter()
                .map(|(p, c)| (p.inverted(), *c))
                .collect(),
            interpolation: self.interpolation,
            periodic: self.periodic,
            level_count: self.level_count,
            lut: OnceLock::new(),
        }
    }

    // -- Lookup --

    /// The table, built first if a setter ran since the last lookup.
    pub fn lut(&self) -> &[Rgba] {
        self.lut.get_or_init(|| self.build_lut())
    }

    /// Table index for `value` within `[lower, upper]`.
    ///
    /// The float index is truncated toward zero; non-finite indices map to 0.
    /// Periodic gradients wrap, others saturate.
    pub fn index_of(&self, value: f64, lower: f64, upper: f64, log_scale: bool) -> usize {
        let last = (self.level_count - 1) as f64;
        let raw = if log_scale {
            (value / lower).ln() / (upper / lower).ln() * last
        } else {
            (value - lower) * last / (upper - lower)
        };
        let idx = if raw.is_finite() { raw as i64 } else { 0 };
        let n = self.level_count as i64;
        if self.periodic {
            idx.rem_euclid(n) as usize
        } else {
            idx.clamp(0, n - 1) as usize
        }
    }

    pub fn color_at(&self, value: f64, lower: f64, upper: f64, log_scale: bool) -> Rgba {
        self.lut()[self.index_of(value, lower, upper, log_scale)]
    }

    /// Colorize one row of values into RGBA bytes (`out.len() == 4·data.len()`).
    pub fn colorize_row(
        &self,
        data: &[f64],
        lower: f64,
        upper: f64,
        log_scale: bool,
        out: &mut [u8],
    ) {
        debug_assert_eq!(out.len(), data.len() * 4);
        let lut = self.lut();
        for (&v, px) in data.iter().zip(out.chunks_exact_mut(4)) {
            let c = lut[self.index_of(v, lower, upper, log_scale)];
            px.copy_from_slice(&c.to_array());
        }
    }

    /// Like [`colorize_row`](Self::colorize_row), with every color scaled by
    /// its pixel's `coverage/255` (alpha included) unless coverage is 255.
    pub fn colorize_row_masked(
        &self,
        data: &[f64],
        coverage: &[u8],
        lower: f64,
        upper: f64,
        log_scale: bool,
        out: &mut [u8],
    ) {
        debug_assert_eq!(out.len(), data.len() * 4);
        debug_assert_eq!(coverage.len(), data.len());
        let lut = self.lut();
        for ((&v, &cov), px) in data.iter().zip(coverage).zip(out.chunks_exact_mut(4)) {
            let c = lut[self.index_of(v, lower, upper, log_scale)];
            let c = if cov == 255 { c } else { c.scaled(cov) };
            px.copy_from_slice(&c.to_array());
        }
    }

    /// Colorize a whole field, rows in parallel.
    pub fn colorize_field(
        &self,
        field: &ScalarField,
        lower: f64,
        upper: f64,
        log_scale: bool,
    ) -> RenderBuffer {
        let mut buffer = RenderBuffer::new(field.width, field.height);
        if field.data.is_empty() {
            return buffer;
        }
        // Build once up front so workers only read.
        self.lut();
        let w = field.width as usize;
        buffer
            .pixels
            .par_chunks_mut(w * 4)
            .zip(field.data.par_chunks(w))
            .for_each(|(out, row)| self.colorize_row(row, lower, upper, log_scale, out));
        buffer
    }

    fn build_lut(&self) -> Vec<Rgba> {
        let n = self.level_count;
        debug!(
            level_count = n,
            stops = self.stops.len(),
            mode = ?self.interpolation,
            "Building gradient table"
        );
        let premultiply = self.stops.values().any(|c| !c.is_opaque());
        let finish = |c: Rgba| if premultiply { c.premultiplied() } else { c };

        let (Some((_, &first)), Some((_, &last))) =
            (self.stops.first_key_value(), self.stops.last_key_value())
        else {
            return vec![Rgba::BLACK; n];
        };
        if self.stops.len() == 1 {
            return vec![finish(first); n];
        }

        let last_idx = (n - 1) as f64;
        (0..n)
            .map(|i| {
                let p = StopPosition::new(i as f64 / last_idx);
                let hi = self.stops.range(p..).next();
                let lo = self.stops.range(..p).next_back();
                let color = match (lo, hi) {
                    (_, None) => last,
                    (_, Some((hp, &hc))) if *hp == p => hc,
                    (None, Some(_)) => first,
                    (Some((lp, &lc)), Some((hp, &hc))) => {
                        let t = (p.value() - lp.value()) / (hp.value() - lp.value());
                        match self.interpolation {
                            Interpolation::Rgb => blend_rgb(lc, hc, t),
                            Interpolation::Hsv => blend_hsv(lc, hc, t),
                        }
                    }
                };
                finish(color)
            })
            .collect()
    }
}

impl Default for ColorGradient {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ColorGradient {
    fn eq(&self, other: &Self) -> bool {
        self.level_count == other.level_count
            && self.interpolation == other.interpolation
            && self.periodic == other.periodic
            && self.stops == other.stops
    }
}

// ---------------------------------------------------------------------------
// Blending
// ---------------------------------------------------------------------------

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    lerp(a as f64, b as f64, t) as u8
}

fn blend_rgb(lo: Rgba, hi: Rgba, t: f64) -> Rgba {
    Rgba::new(
        lerp_channel(lo.r, hi.r, t),
        lerp_channel(lo.g, hi.g, t),
        lerp_channel(lo.b, hi.b, t),
        lerp_channel(lo.a, hi.a, t),
    )
}

/// Hue moves along the shorter arc between the two stops.
pub(crate) fn blend_hue(lo: f64, hi: f64, t: f64) -> f64 {
    let delta = hi - lo;
    let h = if delta > 0.5 {
        lo - t * (1.0 - delta)
    } else if delta < -0.5 {
        lo + t * (1.0 + delta)
    } else {
        lo + t * delta
    };
    wrap_unit(h)
}

fn blend_hsv(lo: Rgba, hi: Rgba, t: f64) -> Rgba {
    let a = lo.to_hsv();
    let b = hi.to_hsv();
    let hsv = Hsv {
        h: blend_hue(a.h, b.h, t),
        s: lerp(a.s, b.s, t),
        v: lerp(a.v, b.v, t),
    };
    Rgba::from_hsv(hsv, lerp_channel(lo.a, hi.a, t))
}

// ---------------------------------------------------------------------------
// Serialized form
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct GradientConfig {
    #[serde(default)]
    stops: Vec<(f64, Rgba)>,
    #[serde(default)]
    interpolation: Interpolation,
    #[serde(default)]
    periodic: bool,
    #[serde(default = "default_level_count")]
    level_count: usize,
}

fn default_level_count() -> usize {
    ColorGradient::DEFAULT_LEVEL_COUNT
}

impl From<GradientConfig> for ColorGradient {
    fn from(cfg: GradientConfig) -> Self {
        let mut g = Self::new();
        g.set_stops(cfg.stops);
        g.set_interpolation(cfg.interpolation);
        g.set_periodic(cfg.periodic);
        g.set_level_count(cfg.level_count);
        g
    }
}

impl From<ColorGradient> for GradientConfig {
    fn from(g: ColorGradient) -> Self {
        Self {
            stops: g.stops().collect(),
            interpolation: g.interpolation,
            periodic: g.periodic,
            level_count: g.level_count,
        }
    }
}
