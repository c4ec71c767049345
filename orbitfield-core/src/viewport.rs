use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// An axis-aligned rectangle on the complex plane.
///
/// `(x, y)` is the corner with the smallest real and imaginary parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Area {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Complex {
        Complex::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Defines the visible region of the complex plane and the output size.
///
/// The viewport is centred on `center`, with `scale` defining how many
/// complex-plane units each pixel spans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Centre of the viewport in the complex plane.
    pub center: Complex,

    /// Complex-plane units per pixel.
    pub scale: f64,

    /// Output width in pixels.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Default view: centred on the Mandelbrot set with the full set visible.
    ///
    /// The set fits in roughly `[-2.0, 0.47] × [-1.12, 1.12]`; the scale is
    /// chosen so the whole set is visible regardless of aspect ratio.
    pub fn default_mandelbrot(width: u32, height: u32) -> Self {
        let target_re = 3.6;
        let target_im = 2.6;
        let scale = (target_re / width.max(1) as f64).max(target_im / height.max(1) as f64);
        Self {
            center: Complex::new(-0.75, 0.0),
            scale,
            width,
            height,
        }
    }

    /// Default view for Julia sets, centred on the origin, spanning roughly
    /// `[-2, 2] × [-2, 2]`.
    pub fn default_julia(width: u32, height: u32) -> Self {
        let extent = 4.2;
        let scale = (extent / width.max(1) as f64).max(extent / height.max(1) as f64);
        Self {
            center: Complex::ZERO,
            scale,
            width,
            height,
        }
    }

    /// Create a viewport with explicit parameters.
    pub fn new(center: Complex, scale: f64, width: u32, height: u32) -> crate::Result<Self> {
        let vp = Self {
            center,
            scale,
            width,
            height,
        };
        vp.validate()?;
        Ok(vp)
    }

    /// Build a viewport that shows all of `area` at `width × height` pixels.
    ///
    /// Pixels stay square: the larger of the two per-axis spacings wins and
    /// the area is centred along the other axis.
    pub fn from_area(area: Area, width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        let scale = (area.width / width as f64).max(area.height / height as f64);
        Self::new(area.center(), scale, width, height)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {}×{}", self.width, self.height),
            });
        }
        if self.scale <= 0.0 || !self.scale.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("scale must be positive and finite, got {}", self.scale),
            });
        }
        Ok(())
    }

    /// Map a pixel coordinate to a point on the complex plane.
    ///
    /// `(0, 0)` is the top-left pixel. The y-axis is flipped so that
    /// increasing pixel-y moves downward (decreasing imaginary part).
    #[inline]
    pub fn pixel_to_complex(&self, px: u32, py: u32) -> Complex {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        Complex::new(
            self.center.re + (px as f64 - half_w) * self.scale,
            self.center.im - (py as f64 - half_h) * self.scale,
        )
    }

    /// The rectangle of the complex plane covered by this viewport.
    pub fn area(&self) -> Area {
        let w = self.complex_width();
        let h = self.complex_height();
        Area::new(self.center.re - w / 2.0, self.center.im - h / 2.0, w, h)
    }

    /// Horizontal extent in complex-plane units.
    pub fn complex_width(&self) -> f64 {
        self.width as f64 * self.scale
    }

    /// Vertical extent in complex-plane units.
    pub fn complex_height(&self) -> f64 {
        self.height as f64 * self.scale
    }

    /// Same region, different output size.
    pub fn resized(&self, width: u32, height: u32) -> crate::Result<Self> {
        Self::from_area(self.area(), width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn default_mandelbrot_viewport() {
        let vp = Viewport::default_mandelbrot(800, 600);
        assert_eq!(vp.width, 800);
        assert_eq!(vp.height, 600);
        assert!((vp.center.re - (-0.75)).abs() < EPSILON);
        assert!(vp.complex_width() >= 3.5);
        assert!(vp.complex_height() >= 2.5);
    }

    #[test]
    fn default_julia_viewport() {
        let vp = Viewport::default_julia(1280, 720);
        assert!(vp.center.re.abs() < EPSILON);
        assert!(vp.complex_width() >= 4.0);
        assert!(vp.complex_height() >= 4.0);
    }

    #[test]
    fn pixel_to_complex_center() {
        let vp = Viewport::new(Complex::ZERO, 0.01, 100, 100).unwrap();
        let c = vp.pixel_to_complex(50, 50);
        assert!(c.re.abs() < EPSILON);
        assert!(c.im.abs() < EPSILON);
    }

    #[test]
    fn pixel_to_complex_corners() {
        let vp = Viewport::new(Complex::ZERO, 1.0, 100, 100).unwrap();

        let tl = vp.pixel_to_complex(0, 0);
        assert!((tl.re - (-50.0)).abs() < EPSILON);
        assert!((tl.im - 50.0).abs() < EPSILON);

        let br = vp.pixel_to_complex(99, 99);
        assert!((br.re - 49.0).abs() < EPSILON);
        assert!((br.im - (-49.0)).abs() < EPSILON);
    }

    #[test]
    fn area_round_trips_through_from_area() {
        let vp = Viewport::new(Complex::new(-0.5, 0.25), 0.004, 300, 200).unwrap();
        let back = Viewport::from_area(vp.area(), 300, 200).unwrap();
        assert!((back.center.re - vp.center.re).abs() < EPSILON);
        assert!((back.center.im - vp.center.im).abs() < EPSILON);
        assert!((back.scale - vp.scale).abs() < EPSILON);
    }

    #[test]
    fn from_area_keeps_whole_area_visible() {
        let area = Area::new(-2.0, -1.0, 4.0, 1.0);
        let vp = Viewport::from_area(area, 100, 100).unwrap();
        assert!(vp.complex_width() >= 4.0 - EPSILON);
        assert!(vp.complex_height() >= 1.0 - EPSILON);
    }

    #[test]
    fn invalid_dimensions() {
        assert!(Viewport::new(Complex::ZERO, 0.01, 0, 100).is_err());
        assert!(Viewport::new(Complex::ZERO, 0.01, 100, 0).is_err());
        assert!(Viewport::from_area(Area::new(0.0, 0.0, 1.0, 1.0), 0, 10).is_err());
    }

    #[test]
    fn invalid_scale() {
        assert!(Viewport::new(Complex::ZERO, 0.0, 100, 100).is_err());
        assert!(Viewport::new(Complex::ZERO, -1.0, 100, 100).is_err());
        assert!(Viewport::new(Complex::ZERO, f64::NAN, 100, 100).is_err());
    }
}
