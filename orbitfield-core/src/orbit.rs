use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Distance measures between an orbit iterate and the trap anchor.
///
/// With anchor `(ax, ay)` and iterate `(x, y)`, `dx = ax − x` and
/// `dy = ay − y`. Discriminants are the wire indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitMetric {
    /// `dx² + dy²`
    #[default]
    SquaredDistance = 0,
    /// `|dx|`
    AbsDx = 1,
    /// `|dy|`
    AbsDy = 2,
    /// `|dx·dy|`
    AbsProduct = 3,
    /// `dx² + dy² − 2dx·dy`
    DiagonalMinus = 4,
    /// `dx² + dy² + 2dx·dy`
    DiagonalPlus = 5,
    /// `dx² + dy² + |2dx·dy|`
    SquaredPlusCross = 6,
    /// `dx² + dy² − |2dx·dy|`
    SquaredMinusCross = 7,
    /// `min(|dx|, |dy|)`
    MinAxis = 8,
    /// `max(|dx|, |dy|)`
    MaxAxis = 9,
    /// `|y − τ·x|`, distance-like measure to the line through the origin and
    /// the anchor.
    Line = 10,
    /// `|dy − dx|`
    AbsDifference = 11,
    /// `|dy + dx|`
    AbsSum = 12,
    /// `|dy| + |dx|`
    Manhattan = 13,
    /// `||dy| − |dx||`
    AxisGap = 14,
}

impl OrbitMetric {
    pub const ALL: [Self; 15] = [
        Self::SquaredDistance,
        Self::AbsDx,
        Self::AbsDy,
        Self::AbsProduct,
        Self::DiagonalMinus,
        Self::DiagonalPlus,
        Self::SquaredPlusCross,
        Self::SquaredMinusCross,
        Self::MinAxis,
        Self::MaxAxis,
        Self::Line,
        Self::AbsDifference,
        Self::AbsSum,
        Self::Manhattan,
        Self::AxisGap,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    /// The plain function evaluating this metric.
    pub fn resolve(self) -> MetricFn {
        match self {
            Self::SquaredDistance => squared_distance,
            Self::AbsDx => abs_dx,
            Self::AbsDy => abs_dy,
            Self::AbsProduct => abs_product,
            Self::DiagonalMinus => diagonal_minus,
            Self::DiagonalPlus => diagonal_plus,
            Self::SquaredPlusCross => squared_plus_cross,
            Self::SquaredMinusCross => squared_minus_cross,
            Self::MinAxis => min_axis,
            Self::MaxAxis => max_axis,
            Self::Line => line,
            Self::AbsDifference => abs_difference,
            Self::AbsSum => abs_sum,
            Self::Manhattan => manhattan,
            Self::AxisGap => axis_gap,
        }
    }
}

impl TryFrom<u32> for OrbitMetric {
    type Error = CoreError;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(CoreError::UnknownOrbitMetric(index))
    }
}

// ---------------------------------------------------------------------------
// Trap geometry and metric functions
// ---------------------------------------------------------------------------

/// Constants derived from the trap anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapGeometry {
    pub ax: f64,
    pub ay: f64,
    /// `tan(arg(anchor))`, slope of the line through the origin and the anchor.
    pub slope: f64,
}

impl TrapGeometry {
    pub fn new(anchor: Complex) -> Self {
        Self {
            ax: anchor.re,
            ay: anchor.im,
            slope: anchor.arg().tan(),
        }
    }
}

pub type MetricFn = fn(&TrapGeometry, f64, f64) -> f64;

#[inline]
fn deltas(g: &TrapGeometry, x: f64, y: f64) -> (f64, f64) {
    (g.ax - x, g.ay - y)
}

fn squared_distance(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    dx * dx + dy * dy
}

fn abs_dx(g: &TrapGeometry, x: f64, _y: f64) -> f64 {
    (g.ax - x).abs()
}

fn abs_dy(g: &TrapGeometry, _x: f64, y: f64) -> f64 {
    (g.ay - y).abs()
}

fn abs_product(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    (dx * dy).abs()
}

fn diagonal_minus(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    dx * dx + dy * dy - 2.0 * dx * dy
}

fn diagonal_plus(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    dx * dx + dy * dy + 2.0 * dx * dy
}

fn squared_plus_cross(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    dx * dx + dy * dy + (2.0 * dx * dy).abs()
}

fn squared_minus_cross(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    dx * dx + dy * dy - (2.0 * dx * dy).abs()
}

fn min_axis(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    dx.abs().min(dy.abs())
}

fn max_axis(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    dx.abs().max(dy.abs())
}

fn line(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    (y - g.slope * x).abs()
}

fn abs_difference(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    (dy - dx).abs()
}

fn abs_sum(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    (dy + dx).abs()
}

fn manhattan(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    dy.abs() + dx.abs()
}

fn axis_gap(g: &TrapGeometry, x: f64, y: f64) -> f64 {
    let (dx, dy) = deltas(g, x, y);
    (dy.abs() - dx.abs()).abs()
}

/// A resolved orbit trap: anchor geometry plus the metric function.
#[derive(Debug, Clone, Copy)]
pub struct OrbitTrap {
    geometry: TrapGeometry,
    metric: MetricFn,
}

impl OrbitTrap {
    pub fn new(anchor: Complex, metric: OrbitMetric) -> Self {
        Self {
            geometry: TrapGeometry::new(anchor),
            metric: metric.resolve(),
        }
    }

    /// Metric value for the iterate `(x, y)`.
    #[inline]
    pub fn distance(&self, x: f64, y: f64) -> f64 {
        (self.metric)(&self.geometry, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn eval(metric: OrbitMetric, anchor: Complex, x: f64, y: f64) -> f64 {
        OrbitTrap::new(anchor, metric).distance(x, y)
    }

    #[test]
    fn index_round_trip() {
        for metric in OrbitMetric::ALL {
            assert_eq!(OrbitMetric::try_from(metric.index()), Ok(metric));
        }
        assert_eq!(
            OrbitMetric::try_from(15),
            Err(CoreError::UnknownOrbitMetric(15))
        );
    }

    #[test]
    fn metrics_at_known_point() {
        // anchor (1, 2), iterate (4, -2): dx = -3, dy = 4
        let a = Complex::new(1.0, 2.0);
        let (x, y) = (4.0, -2.0);
        let expected = [
            25.0,       // dx² + dy²
            3.0,        // |dx|
            4.0,        // |dy|
            12.0,       // |dx·dy|
            25.0 + 24.0, // − 2dx·dy
            25.0 - 24.0, // + 2dx·dy
            49.0,
            1.0,
            3.0,
            4.0,
            (-2.0f64 - 2.0 * 4.0).abs(), // slope of (1, 2) is 2
            7.0,
            1.0,
            7.0,
            1.0,
        ];
        for (metric, want) in OrbitMetric::ALL.into_iter().zip(expected) {
            let got = eval(metric, a, x, y);
            assert!((got - want).abs() < 1e-9, "{metric:?}: got {got}, want {want}");
        }
    }

    #[test]
    fn anchor_itself_is_zero_distance() {
        let a = Complex::new(-0.3, 0.7);
        for metric in OrbitMetric::ALL {
            if metric == OrbitMetric::Line {
                continue;
            }
            assert!(eval(metric, a, a.re, a.im).abs() < EPSILON, "{metric:?}");
        }
    }

    #[test]
    fn line_metric_vanishes_on_the_anchor_ray() {
        let a = Complex::new(2.0, 1.0);
        assert!(eval(OrbitMetric::Line, a, 4.0, 2.0).abs() < EPSILON);
        assert!((eval(OrbitMetric::Line, a, 0.0, 1.0) - 1.0).abs() < EPSILON);
    }
}
