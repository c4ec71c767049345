use crate::color::Rgba;

/// An RGBA pixel buffer representing a colorized field.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
}

impl RenderBuffer {
    /// Create a new buffer filled with black (opaque).
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        // Set alpha to 255 for all pixels.
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[3] = 255;
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Rgba::new(p[0], p[1], p[2], p[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_black_opaque() {
        let buf = RenderBuffer::new(4, 4);
        assert_eq!(buf.pixels.len(), 4 * 4 * 4);
        for chunk in buf.pixels.chunks_exact(4) {
            assert_eq!(chunk, &[0, 0, 0, 255]);
        }
        assert_eq!(buf.stride(), 16);
    }

    #[test]
    fn pixel_reads_row_major() {
        let mut buf = RenderBuffer::new(3, 2);
        let idx = (3 + 2) * 4;
        buf.pixels[idx..idx + 4].copy_from_slice(&[255, 0, 0, 255]);
        assert_eq!(buf.pixel(2, 1), Rgba::rgb(255, 0, 0));
        assert_eq!(buf.pixel(0, 0), Rgba::BLACK);
    }
}
