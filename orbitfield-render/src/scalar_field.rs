use orbitfield_core::Viewport;
use rayon::prelude::*;

use crate::error::RenderError;

/// 5×5 Gaussian kernel, weights summing to 273.
const GAUSSIAN_5X5: [[f64; 5]; 5] = [
    [1.0, 4.0, 7.0, 4.0, 1.0],
    [4.0, 16.0, 26.0, 16.0, 4.0],
    [7.0, 26.0, 41.0, 26.0, 7.0],
    [4.0, 16.0, 26.0, 16.0, 4.0],
    [1.0, 4.0, 7.0, 4.0, 1.0],
];
const GAUSSIAN_WEIGHT: f64 = 273.0;

/// One scalar per pixel for a full frame.
///
/// This is the raw output of the renderer before coloring. Keeping the field
/// separate from colored pixels enables instant gradient switching without
/// re-computing any orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub width: u32,
    pub height: u32,
    /// The view the field was computed for.
    pub viewport: Viewport,
    /// Row-major values.
    pub data: Vec<f64>,
}

impl ScalarField {
    /// A zero-filled field sized to `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        let size = viewport.width as usize * viewport.height as usize;
        Self {
            width: viewport.width,
            height: viewport.height,
            viewport,
            data: vec![0.0; size],
        }
    }

    pub fn from_data(viewport: Viewport, data: Vec<f64>) -> crate::Result<Self> {
        let expected = viewport.width as usize * viewport.height as usize;
        if data.len() != expected {
            return Err(RenderError::FieldSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width: viewport.width,
            height: viewport.height,
            viewport,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn row(&self, y: u32) -> &[f64] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.data[start..start + w]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.width.max(1) as usize)
    }

    /// Minimum and maximum over the finite values, `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .par_iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(
                || None,
                |acc: Option<(f64, f64)>, v| match acc {
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                    None => Some((v, v)),
                },
            )
            .reduce(
                || None,
                |a, b| match (a, b) {
                    (Some((alo, ahi)), Some((blo, bhi))) => Some((alo.min(blo), ahi.max(bhi))),
                    (x, None) | (None, x) => x,
                },
            )
    }

    /// A copy blurred with a 5×5 Gaussian kernel; out-of-range taps are
    /// clamped to the nearest edge pixel.
    pub fn smoothed(&self) -> Self {
        let w = self.width as i64;
        let h = self.height as i64;
        let mut data = vec![0.0; self.data.len()];
        data.par_chunks_mut(self.width.max(1) as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as i64;
                for (x, out) in row.iter_mut().enumerate() {
                    let x = x as i64;
                    let mut acc = 0.0;
                    for (ky, weights) in GAUSSIAN_5X5.iter().enumerate() {
                        let sy = (y + ky as i64 - 2).clamp(0, h - 1) as usize;
                        for (kx, weight) in weights.iter().enumerate() {
                            let sx = (x + kx as i64 - 2).clamp(0, w - 1) as usize;
                            acc += weight * self.data[sy * w as usize + sx];
                        }
                    }
                    *out = acc / GAUSSIAN_WEIGHT;
                }
            });
        Self {
            width: self.width,
            height: self.height,
            viewport: self.viewport,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitfield_core::Complex;

    fn viewport(w: u32, h: u32) -> Viewport {
        Viewport::new(Complex::ZERO, 0.01, w, h).unwrap()
    }

    #[test]
    fn from_data_checks_length() {
        assert!(ScalarField::from_data(viewport(3, 2), vec![0.0; 6]).is_ok());
        assert!(matches!(
            ScalarField::from_data(viewport(3, 2), vec![0.0; 5]),
            Err(RenderError::FieldSizeMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn row_access() {
        let field = ScalarField::from_data(viewport(3, 2), (0..6).map(f64::from).collect()).unwrap();
        assert_eq!(field.row(1), &[3.0, 4.0, 5.0]);
        assert_eq!(field.get(2, 0), 2.0);
        assert_eq!(field.rows().count(), 2);
    }

    #[test]
    fn value_range_skips_non_finite() {
        let data = vec![3.0, f64::NAN, -1.0, f64::INFINITY, 7.5, 0.0];
        let field = ScalarField::from_data(viewport(3, 2), data).unwrap();
        assert_eq!(field.value_range(), Some((-1.0, 7.5)));

        let empty = ScalarField::from_data(viewport(1, 1), vec![f64::NAN]).unwrap();
        assert_eq!(empty.value_range(), None);
    }

    #[test]
    fn smoothing_preserves_constant_field() {
        let field = ScalarField::from_data(viewport(7, 5), vec![4.25; 35]).unwrap();
        let s = field.smoothed();
        for v in &s.data {
            assert!((v - 4.25).abs() < 1e-12);
        }
    }

    #[test]
    fn smoothing_spreads_a_spike() {
        let mut data = vec![0.0; 81];
        data[4 * 9 + 4] = 273.0;
        let field = ScalarField::from_data(viewport(9, 9), data).unwrap();
        let s = field.smoothed();
        assert!((s.get(4, 4) - 41.0).abs() < 1e-12);
        assert!((s.get(5, 4) - 26.0).abs() < 1e-12);
        assert!((s.get(6, 6) - 1.0).abs() < 1e-12);
        assert_eq!(s.get(0, 0), 0.0);
        let total: f64 = s.data.iter().sum();
        assert!((total - 273.0).abs() < 1e-9);
    }
}
