//! Raw scalar-field files and PNG export with embedded metadata (tEXt chunks).

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use orbitfield_core::{FractalParameters, Viewport};

use crate::buffer::RenderBuffer;
use crate::error::RenderError;
use crate::scalar_field::ScalarField;
use crate::session::DisplaySettings;

// ---------------------------------------------------------------------------
// Raw field
// ---------------------------------------------------------------------------

/// Write `field` as two little-endian `i32` (width, height) followed by
/// `width·height` little-endian `f64` values, row-major.
pub fn write_raw<W: Write>(field: &ScalarField, out: W) -> crate::Result<()> {
    let to_i32 = |v: u32| {
        i32::try_from(v).map_err(|_| RenderError::InvalidDimensions {
            width: field.width,
            height: field.height,
        })
    };
    let mut out = BufWriter::new(out);
    out.write_all(&to_i32(field.width)?.to_le_bytes())?;
    out.write_all(&to_i32(field.height)?.to_le_bytes())?;
    for v in &field.data {
        out.write_all(&v.to_le_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Read a raw field written by [`write_raw`].
///
/// The file carries no view information, so the caller supplies the
/// viewport; its size must match the header.
pub fn read_raw<R: Read>(input: R, viewport: Viewport) -> crate::Result<ScalarField> {
    let mut input = BufReader::new(input);
    let mut word = [0u8; 4];
    input.read_exact(&mut word)?;
    let width = i32::from_le_bytes(word);
    input.read_exact(&mut word)?;
    let height = i32::from_le_bytes(word);

    if width <= 0 || height <= 0 {
        return Err(RenderError::InvalidRawField {
            reason: format!("header size {width}×{height}"),
        });
    }
    if (width as u32, height as u32) != (viewport.width, viewport.height) {
        return Err(RenderError::InvalidRawField {
            reason: format!(
                "header size {width}×{height} does not match viewport {}×{}",
                viewport.width, viewport.height
            ),
        });
    }

    let count = width as usize * height as usize;
    let mut bytes = Vec::with_capacity(count * 8);
    input.read_to_end(&mut bytes)?;
    if bytes.len() != count * 8 {
        return Err(RenderError::InvalidRawField {
            reason: format!("expected {} data bytes, got {}", count * 8, bytes.len()),
        });
    }
    let data = bytes
        .chunks_exact(8)
        .map(|b| {
            let mut v = [0u8; 8];
            v.copy_from_slice(b);
            f64::from_le_bytes(v)
        })
        .collect();
    ScalarField::from_data(viewport, data)
}

pub fn save_raw(field: &ScalarField, path: &Path) -> crate::Result<()> {
    write_raw(field, std::fs::File::create(path)?)?;
    info!(
        path = %path.display(),
        width = field.width,
        height = field.height,
        "Exported raw field"
    );
    Ok(())
}

pub fn load_raw(path: &Path, viewport: Viewport) -> crate::Result<ScalarField> {
    read_raw(std::fs::File::open(path)?, viewport)
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

/// Metadata to embed in an exported PNG as tEXt chunks.
pub struct ExportMetadata {
    pub family: String,
    pub plane: String,
    pub coloring: String,
    pub center_re: String,
    pub center_im: String,
    pub scale: String,
    pub max_iterations: u32,
    pub max_norm: f64,
    pub power: u32,
    pub c: String,
    pub q: String,
    pub orbit_point: String,
    pub orbit_metric: String,
    pub gradient: String,
    pub range: String,
    pub width: u32,
    pub height: u32,
}

impl ExportMetadata {
    pub fn new(params: &FractalParameters, display: &DisplaySettings) -> Self {
        let vp = &params.viewport;
        Self {
            family: params.family.label().to_string(),
            plane: format!("{:?}", params.plane),
            coloring: format!("{:?}", params.coloring),
            center_re: format!("{}", vp.center.re),
            center_im: format!("{}", vp.center.im),
            scale: format!("{:e}", vp.scale),
            max_iterations: params.max_iterations,
            max_norm: params.max_norm,
            power: params.power,
            c: params.c.to_string(),
            q: params.q.to_string(),
            orbit_point: params.orbit_point.to_string(),
            orbit_metric: format!("{:?}", params.orbit_metric),
            gradient: display.preset.name().to_string(),
            range: format!(
                "{} .. {}{}",
                display.lower,
                display.upper,
                if display.log_scale { " (log)" } else { "" }
            ),
            width: vp.width,
            height: vp.height,
        }
    }
}

/// Write an RGBA pixel buffer as a PNG file with embedded fractal metadata.
///
/// Uses the `png` crate directly to inject custom tEXt chunks readable by
/// exiftool and most image viewers.
pub fn export_png(
    buffer: &RenderBuffer,
    path: &Path,
    metadata: &ExportMetadata,
) -> crate::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "orbitfield".to_string())?;
    encoder.add_text_chunk("Description".to_string(), build_description(metadata))?;
    for (key, value) in build_metadata_pairs(metadata) {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&buffer.pixels)?;
    png_writer.finish()?;

    debug!(
        "Exported PNG {}x{} to {}",
        buffer.width,
        buffer.height,
        path.display()
    );
    Ok(())
}

fn build_description(meta: &ExportMetadata) -> String {
    format!(
        "{} ({} plane, {}) - Center: {} {}i, Scale: {}, Iterations: {}",
        meta.family,
        meta.plane,
        meta.coloring,
        meta.center_re,
        meta.center_im,
        meta.scale,
        meta.max_iterations,
    )
}

fn build_metadata_pairs(meta: &ExportMetadata) -> Vec<(String, String)> {
    vec![
        ("Orbitfield.Family".into(), meta.family.clone()),
        ("Orbitfield.Plane".into(), meta.plane.clone()),
        ("Orbitfield.Coloring".into(), meta.coloring.clone()),
        ("Orbitfield.CenterRe".into(), meta.center_re.clone()),
        ("Orbitfield.CenterIm".into(), meta.center_im.clone()),
        ("Orbitfield.Scale".into(), meta.scale.clone()),
        ("Orbitfield.MaxIterations".into(), meta.max_iterations.to_string()),
        ("Orbitfield.MaxNorm".into(), format!("{}", meta.max_norm)),
        ("Orbitfield.Power".into(), meta.power.to_string()),
        ("Orbitfield.C".into(), meta.c.clone()),
        ("Orbitfield.Q".into(), meta.q.clone()),
        ("Orbitfield.OrbitPoint".into(), meta.orbit_point.clone()),
        ("Orbitfield.OrbitMetric".into(), meta.orbit_metric.clone()),
        ("Orbitfield.Gradient".into(), meta.gradient.clone()),
        ("Orbitfield.Range".into(), meta.range.clone()),
        ("Orbitfield.Resolution".into(), format!("{}x{}", meta.width, meta.height)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitfield_core::Complex;
    use std::io::Cursor;

    fn field(w: u32, h: u32) -> ScalarField {
        let vp = Viewport::new(Complex::ZERO, 0.1, w, h).unwrap();
        let data = (0..w * h).map(|i| i as f64 * 0.5 - 1.0).collect();
        ScalarField::from_data(vp, data).unwrap()
    }

    #[test]
    fn raw_layout() {
        let f = field(3, 2);
        let mut bytes = Vec::new();
        write_raw(&f, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 8 + 6 * 8);
        assert_eq!(&bytes[0..4], &3i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2i32.to_le_bytes());
        assert_eq!(&bytes[8..16], &(-1.0f64).to_le_bytes());
        assert_eq!(&bytes[48..56], &1.5f64.to_le_bytes());
    }

    #[test]
    fn raw_read_back_preserves_non_finite_values() {
        let mut f = field(2, 2);
        f.data[1] = f64::NAN;
        f.data[2] = f64::NEG_INFINITY;
        let mut bytes = Vec::new();
        write_raw(&f, &mut bytes).unwrap();
        let back = read_raw(Cursor::new(bytes), f.viewport).unwrap();
        let bits = |d: &[f64]| d.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&back.data), bits(&f.data));
    }

    #[test]
    fn raw_rejects_wrong_size_and_truncation() {
        let f = field(3, 2);
        let mut bytes = Vec::new();
        write_raw(&f, &mut bytes).unwrap();

        let other = Viewport::new(Complex::ZERO, 0.1, 2, 3).unwrap();
        assert!(matches!(
            read_raw(Cursor::new(bytes.clone()), other),
            Err(RenderError::InvalidRawField { .. })
        ));
        bytes.pop();
        assert!(matches!(
            read_raw(Cursor::new(bytes), f.viewport),
            Err(RenderError::InvalidRawField { .. })
        ));
    }

    #[test]
    fn export_creates_valid_png() {
        let buffer = RenderBuffer::new(4, 4);
        let params = FractalParameters::default();
        let meta = ExportMetadata::new(&params, &DisplaySettings::default());
        let dir = std::env::temp_dir().join("orbitfield_test_export");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("test_export.png");
        export_png(&buffer, &path, &meta).expect("export should succeed");

        let mut file = std::fs::File::open(&path).expect("file should exist");
        let mut header = [0u8; 8];
        file.read_exact(&mut header).expect("should read header");
        assert_eq!(&header, b"\x89PNG\r\n\x1a\n", "valid PNG signature");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_embeds_text_chunks() {
        let buffer = RenderBuffer::new(2, 2);
        let params = FractalParameters {
            family: orbitfield_core::FamilyKind::PowerN,
            power: 4,
            ..Default::default()
        };
        let meta = ExportMetadata::new(&params, &DisplaySettings::default());
        let dir = std::env::temp_dir().join("orbitfield_test_export_meta");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("test_meta.png");
        export_png(&buffer, &path, &meta).expect("export should succeed");

        let decoder = png::Decoder::new(std::fs::File::open(&path).expect("file should exist"));
        let reader = decoder.read_info().expect("should read info");
        let texts = &reader.info().uncompressed_latin1_text;
        assert!(
            texts.iter().any(|t| t.keyword == "Software" && t.text == "orbitfield"),
            "Should contain Software text chunk"
        );
        assert!(
            texts
                .iter()
                .any(|t| t.keyword == "Orbitfield.Family" && t.text == "Power N"),
            "Should contain family chunk"
        );
        assert!(
            texts
                .iter()
                .any(|t| t.keyword == "Orbitfield.Power" && t.text == "4"),
            "Should contain power chunk"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
