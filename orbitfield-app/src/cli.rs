//! Command-line arguments and how they override a loaded session.

use std::path::PathBuf;

use clap::Parser;

use orbitfield_core::{
    Area, ColoringMode, Complex, DenominatorPolicy, FamilyKind, FractalParameters, OrbitMetric,
    Plane, Viewport,
};
use orbitfield_render::{DisplaySettings, GradientPreset, SessionRecord};

use crate::error::{AppError, Result};

/// Render one escape-time or Newton fractal field headlessly.
///
/// Example:
///   orbitfield --family 2 --power 3 --width 1920 --height 1080 --preset jet --png out.png
#[derive(Parser, Debug)]
#[command(name = "orbitfield", version, about)]
pub struct Cli {
    /// Start from a binary session record.
    #[arg(long, value_name = "FILE", conflicts_with = "params")]
    pub load: Option<PathBuf>,

    /// Start from fractal parameters stored as JSON.
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Family index (0 rational q, 1 quadratic, 2 power n, 3 Newton power n,
    /// 4 Newton rational q).
    #[arg(long)]
    pub family: Option<u32>,

    /// Use the Julia plane instead of the Mandelbrot plane.
    #[arg(long)]
    pub julia: bool,

    /// Coloring mode index (0 escape time, 1 smooth escape, 2 orbit trap).
    #[arg(long)]
    pub coloring: Option<u32>,

    /// Orbit metric index (0..=14).
    #[arg(long)]
    pub metric: Option<u32>,

    #[arg(long)]
    pub iterations: Option<u32>,

    /// Escape radius.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Integer power n.
    #[arg(long)]
    pub power: Option<u32>,

    #[arg(long, num_args = 2, value_names = ["RE", "IM"], allow_negative_numbers = true)]
    pub c: Option<Vec<f64>>,

    #[arg(long, num_args = 2, value_names = ["RE", "IM"], allow_negative_numbers = true)]
    pub q: Option<Vec<f64>>,

    #[arg(long, num_args = 2, value_names = ["RE", "IM"], allow_negative_numbers = true)]
    pub orbit_point: Option<Vec<f64>>,

    /// Visible rectangle of the plane (lower-left corner, then size).
    #[arg(long, num_args = 4, value_names = ["X", "Y", "W", "H"], allow_negative_numbers = true)]
    pub area: Option<Vec<f64>>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Floor denominators at this magnitude instead of dividing as-is.
    #[arg(long, value_name = "MIN")]
    pub clamp_denominator: Option<f64>,

    /// Gradient preset name (grayscale, hot, cold, night, candy, geography,
    /// ion, thermal, polar, spectrum, jet, hues).
    #[arg(long)]
    pub preset: Option<String>,

    /// Logarithmic value mapping.
    #[arg(long)]
    pub log: bool,

    /// Wrap values outside the range instead of saturating.
    #[arg(long)]
    pub periodic: bool,

    /// Mapped data range; computed from the field when omitted.
    #[arg(long, num_args = 2, value_names = ["LOWER", "UPPER"], allow_negative_numbers = true)]
    pub range: Option<Vec<f64>>,

    /// Blur the field with a 5×5 Gaussian before coloring and export.
    #[arg(long)]
    pub smooth: bool,

    /// Write the colorized image here.
    #[arg(long, value_name = "FILE")]
    pub png: Option<PathBuf>,

    /// Write the raw scalar field here.
    #[arg(long, value_name = "FILE")]
    pub raw: Option<PathBuf>,

    /// Write the session record (parameters and final display settings).
    #[arg(long, value_name = "FILE")]
    pub save_record: Option<PathBuf>,

    /// Print the effective parameters as JSON.
    #[arg(long)]
    pub print_params: bool,
}

fn complex(pair: &[f64]) -> Complex {
    Complex::new(pair[0], pair[1])
}

impl Cli {
    /// Whether the data range has to be taken from the rendered field.
    pub fn wants_auto_range(&self) -> bool {
        self.range.is_none() && self.load.is_none()
    }

    /// Apply every flag on top of `base`.
    pub fn apply(&self, base: SessionRecord) -> Result<SessionRecord> {
        let SessionRecord {
            mut params,
            mut display,
        } = base;
        self.apply_params(&mut params)?;
        self.apply_display(&mut display)?;
        Ok(SessionRecord::new(params, display))
    }

    fn apply_params(&self, p: &mut FractalParameters) -> Result<()> {
        if let Some(index) = self.family {
            p.family = FamilyKind::try_from(index)?;
        }
        if self.julia {
            p.plane = Plane::Julia;
        }
        if let Some(index) = self.coloring {
            p.coloring = ColoringMode::try_from(index)?;
        }
        if let Some(index) = self.metric {
            p.orbit_metric = OrbitMetric::try_from(index)?;
        }
        if let Some(n) = self.iterations {
            p.max_iterations = n;
        }
        if let Some(r) = self.radius {
            p.max_norm = r;
        }
        if let Some(n) = self.power {
            p.power = n;
        }
        if let Some(c) = &self.c {
            p.c = complex(c);
        }
        if let Some(q) = &self.q {
            p.q = complex(q);
        }
        if let Some(o) = &self.orbit_point {
            p.orbit_point = complex(o);
        }
        if let Some(min_magnitude) = self.clamp_denominator {
            if min_magnitude.is_nan() || min_magnitude <= 0.0 {
                return Err(AppError::InvalidArgument(format!(
                    "denominator clamp must be positive, got {min_magnitude}"
                )));
            }
            p.denominator = DenominatorPolicy::Clamp { min_magnitude };
        }

        let width = self.width.unwrap_or(p.viewport.width);
        let height = self.height.unwrap_or(p.viewport.height);
        p.viewport = match &self.area {
            Some(a) => Viewport::from_area(Area::new(a[0], a[1], a[2], a[3]), width, height)?,
            None if (width, height) != (p.viewport.width, p.viewport.height) => {
                p.viewport.resized(width, height)?
            }
            None => p.viewport,
        };
        Ok(())
    }

    fn apply_display(&self, d: &mut DisplaySettings) -> Result<()> {
        if let Some(name) = &self.preset {
            d.preset = GradientPreset::from_name(name)
                .ok_or_else(|| AppError::UnknownPreset(name.clone()))?;
        }
        d.log_scale |= self.log;
        d.periodic |= self.periodic;
        if let Some(r) = &self.range {
            d.lower = r[0];
            d.upper = r[1];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("orbitfield").chain(args.iter().copied())).unwrap()
    }

    fn defaults() -> SessionRecord {
        SessionRecord::new(FractalParameters::default(), DisplaySettings::default())
    }

    #[test]
    fn no_flags_keep_the_base() {
        let rec = parse(&[]).apply(defaults()).unwrap();
        assert_eq!(rec, defaults());
    }

    #[test]
    fn flags_override_parameters() {
        let cli = parse(&[
            "--family", "2", "--power", "5", "--julia", "--coloring", "2", "--metric", "14",
            "--c", "-0.8", "0.156", "--iterations", "500",
        ]);
        let p = cli.apply(defaults()).unwrap().params;
        assert_eq!(p.family, FamilyKind::PowerN);
        assert_eq!(p.power, 5);
        assert_eq!(p.plane, Plane::Julia);
        assert_eq!(p.coloring, ColoringMode::OrbitTrap);
        assert_eq!(p.orbit_metric.index(), 14);
        assert_eq!(p.c, Complex::new(-0.8, 0.156));
        assert_eq!(p.max_iterations, 500);
    }

    #[test]
    fn family_flag_uses_wire_order() {
        let expected = [
            FamilyKind::RationalQ,
            FamilyKind::Quadratic,
            FamilyKind::PowerN,
            FamilyKind::NewtonPowerN,
            FamilyKind::NewtonRationalQ,
        ];
        for (index, family) in expected.into_iter().enumerate() {
            let cli = parse(&["--family", &index.to_string()]);
            assert_eq!(cli.apply(defaults()).unwrap().params.family, family);
        }
    }

    #[test]
    fn area_and_size_build_the_viewport() {
        let cli = parse(&["--area", "-2", "-1", "3", "2", "--width", "300", "--height", "200"]);
        let vp = cli.apply(defaults()).unwrap().params.viewport;
        assert_eq!((vp.width, vp.height), (300, 200));
        assert!((vp.center.re + 0.5).abs() < 1e-12);
        assert!(vp.center.im.abs() < 1e-12);
        assert!((vp.scale - 0.01).abs() < 1e-15);
    }

    #[test]
    fn display_flags() {
        let cli = parse(&["--preset", "Polar", "--log", "--range", "1", "100"]);
        assert!(cli.range.is_some());
        assert!(!cli.wants_auto_range());
        let d = cli.apply(defaults()).unwrap().display;
        assert_eq!(d.preset, GradientPreset::Polar);
        assert!(d.log_scale);
        assert!(!d.periodic);
        assert_eq!((d.lower, d.upper), (1.0, 100.0));
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            parse(&["--preset", "plasma"]).apply(defaults()),
            Err(AppError::UnknownPreset(_))
        ));
        assert!(matches!(
            parse(&["--family", "7"]).apply(defaults()),
            Err(AppError::Core(_))
        ));
        assert!(matches!(
            parse(&["--clamp-denominator", "0"]).apply(defaults()),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn load_and_params_conflict() {
        let res = Cli::try_parse_from(["orbitfield", "--load", "a.orbf", "--params", "b.json"]);
        assert!(res.is_err());
    }
}
