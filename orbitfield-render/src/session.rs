//! The persisted parameter file.
//!
//! A fixed-layout little-endian record:
//!
//! | field | type |
//! |---|---|
//! | magic `ORBF` | 4 bytes |
//! | format version | u32 |
//! | power `n` | u32 |
//! | max iterations | u32 |
//! | max norm | f64 |
//! | image width, height | u32, u32 |
//! | area x, y, width, height | 4 × f64 |
//! | c re, im | 2 × f64 |
//! | q re, im | 2 × f64 |
//! | Mandelbrot plane flag | u8 |
//! | gradient preset index | u32 |
//! | log-scale flag | u8 |
//! | periodic flag | u8 |
//! | data range lower, upper | 2 × f64 |
//! | coloring mode index | u32 |
//! | orbit point re, im | 2 × f64 |
//! | orbit metric index | u32 |
//! | family index | u32 |
//! | denominator clamp (0 = propagate) | f64 |
//!
//! Reading rejects a wrong magic, an unknown version, unknown indices, flags
//! other than 0 or 1, and any length other than the exact record size.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use orbitfield_core::{
    Area, ColoringMode, Complex, DenominatorPolicy, FamilyKind, FractalParameters, OrbitMetric,
    Plane, Viewport,
};

use crate::error::RenderError;
use crate::gradient::ColorGradient;
use crate::presets::GradientPreset;

const MAGIC: [u8; 4] = *b"ORBF";
pub const FORMAT_VERSION: u32 = 1;

/// Exact size in bytes of a version-1 record.
pub const RECORD_LEN: usize = 4 + 4 // magic, version
    + 4 + 4 + 8 // n, max_iterations, max_norm
    + 4 + 4 // image size
    + 4 * 8 // area
    + 4 * 8 // c, q
    + 1 // plane
    + 4 + 1 + 1 // preset, log, periodic
    + 2 * 8 // range
    + 4 // coloring
    + 2 * 8 // orbit point
    + 4 + 4 // metric, family
    + 8; // denominator

/// How the consumer maps a field to colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub preset: GradientPreset,
    pub log_scale: bool,
    pub periodic: bool,
    /// Lower bound of the mapped data range.
    pub lower: f64,
    /// Upper bound of the mapped data range.
    pub upper: f64,
}

impl DisplaySettings {
    /// The gradient these settings describe.
    pub fn gradient(&self) -> ColorGradient {
        let mut g = ColorGradient::from_preset(self.preset);
        g.set_periodic(self.periodic);
        g
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            preset: GradientPreset::default(),
            log_scale: false,
            periodic: false,
            lower: 0.0,
            upper: FractalParameters::DEFAULT_MAX_ITERATIONS as f64,
        }
    }
}

/// Everything needed to reproduce a view: computation parameters plus
/// display settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub params: FractalParameters,
    pub display: DisplaySettings,
}

impl SessionRecord {
    pub fn new(params: FractalParameters, display: DisplaySettings) -> Self {
        Self { params, display }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let p = &self.params;
        let d = &self.display;
        let area = p.viewport.area();
        let clamp = match p.denominator {
            DenominatorPolicy::Propagate => 0.0,
            DenominatorPolicy::Clamp { min_magnitude } => min_magnitude,
        };

        let mut w = RecordWriter::with_capacity(RECORD_LEN);
        w.bytes(&MAGIC);
        w.u32(FORMAT_VERSION);
        w.u32(p.power);
        w.u32(p.max_iterations);
        w.f64(p.max_norm);
        w.u32(p.viewport.width);
        w.u32(p.viewport.height);
        w.f64(area.x);
        w.f64(area.y);
        w.f64(area.width);
        w.f64(area.height);
        w.f64(p.c.re);
        w.f64(p.c.im);
        w.f64(p.q.re);
        w.f64(p.q.im);
        w.flag(p.plane.is_mandelbrot());
        w.u32(d.preset.index());
        w.flag(d.log_scale);
        w.flag(d.periodic);
        w.f64(d.lower);
        w.f64(d.upper);
        w.u32(p.coloring.index());
        w.f64(p.orbit_point.re);
        w.f64(p.orbit_point.im);
        w.u32(p.orbit_metric.index());
        w.u32(p.family.index());
        w.f64(clamp);
        debug_assert_eq!(w.buf.len(), RECORD_LEN);
        w.buf
    }

    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.len() < 8 {
            return Err(invalid(format!("{} bytes is too short", bytes.len())));
        }
        let mut r = RecordReader { bytes, pos: 0 };
        if r.take::<4>()? != MAGIC {
            return Err(invalid("bad magic".into()));
        }
        let version = r.u32()?;
        if version != FORMAT_VERSION {
            return Err(RenderError::UnsupportedVersion(version));
        }
        if bytes.len() != RECORD_LEN {
            return Err(invalid(format!(
                "expected {RECORD_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let power = r.u32()?;
        let max_iterations = r.u32()?;
        let max_norm = r.f64()?;
        let width = r.u32()?;
        let height = r.u32()?;
        let area = Area::new(r.f64()?, r.f64()?, r.f64()?, r.f64()?);
        let c = Complex::new(r.f64()?, r.f64()?);
        let q = Complex::new(r.f64()?, r.f64()?);
        let plane = Plane::from_mandelbrot_flag(r.flag()?);
        let preset = GradientPreset::try_from(r.u32()?)?;
        let log_scale = r.flag()?;
        let periodic = r.flag()?;
        let lower = r.f64()?;
        let upper = r.f64()?;
        let coloring = ColoringMode::try_from(r.u32()?)?;
        let orbit_point = Complex::new(r.f64()?, r.f64()?);
        let orbit_metric = OrbitMetric::try_from(r.u32()?)?;
        let family = FamilyKind::try_from(r.u32()?)?;
        let clamp = r.f64()?;
        let denominator = if clamp == 0.0 {
            DenominatorPolicy::Propagate
        } else {
            DenominatorPolicy::Clamp {
                min_magnitude: clamp,
            }
        };

        let params = FractalParameters {
            family,
            max_iterations,
            max_norm,
            c,
            q,
            orbit_point,
            plane,
            coloring,
            orbit_metric,
            power,
            viewport: Viewport::from_area(area, width, height)?,
            denominator,
        };
        Ok(Self {
            params,
            display: DisplaySettings {
                preset,
                log_scale,
                periodic,
                lower,
                upper,
            },
        })
    }

    pub fn save(&self, path: &Path) -> crate::Result<()> {
        std::fs::write(path, self.to_bytes())?;
        info!(path = %path.display(), "Saved session record");
        Ok(())
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let bytes = std::fs::read(path)?;
        let record = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            family = record.params.family.label(),
            "Loaded session record"
        );
        Ok(record)
    }
}

fn invalid(reason: String) -> RenderError {
    RenderError::InvalidSessionRecord { reason }
}

// ---------------------------------------------------------------------------
// Little-endian cursor
// ---------------------------------------------------------------------------

struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    fn with_capacity(n: usize) -> Self {
        Self {
            buf: Vec::with_capacity(n),
        }
    }

    fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    fn f64(&mut self, v: f64) {
        self.bytes(&v.to_le_bytes());
    }

    fn flag(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }
}

struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl RecordReader<'_> {
    fn take<const N: usize>(&mut self) -> crate::Result<[u8; N]> {
        let end = self.pos + N;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| invalid(format!("truncated at byte {}", self.pos)))?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn u32(&mut self) -> crate::Result<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn f64(&mut self) -> crate::Result<f64> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    fn flag(&mut self) -> crate::Result<bool> {
        match self.take::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(invalid(format!("flag byte {other} at offset {}", self.pos - 1))),
        }
    }
}
