//! Export for finished composites
//!
//! Only PNG for now. The composite is already straight-alpha RGBA8, so
//! encoding is a size check followed by the image crate's PNG encoder.

use std::path::Path;

use image::ImageEncoder;

use engrave_core::{
    error::{ExportError, Result},
    traits::Exporter,
    types::CompositeImage,
};

/// Encode a composite as an RGBA PNG
pub fn encode_png(image: &CompositeImage) -> Result<Vec<u8>> {
    if image.width == 0 || image.height == 0 {
        return Err(ExportError::EncodingFailed(format!(
            "cannot encode an empty {}x{} image",
            image.width, image.height
        ))
        .into());
    }

    let expected = image.width as usize * image.height as usize * 4;
    if image.data.len() != expected {
        return Err(ExportError::EncodingFailed(format!(
            "RGBA buffer is {} bytes, {}x{} needs {}",
            image.data.len(),
            image.width,
            image.height,
            expected
        ))
        .into());
    }

    let mut png_data = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        &mut png_data,
        image::codecs::png::CompressionType::Default,
        image::codecs::png::FilterType::Sub,
    );
    encoder
        .write_image(
            &image.data,
            image.width,
            image.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| ExportError::EncodingFailed(format!("PNG encoding failed: {}", e)))?;

    log::debug!(
        "PngExporter: {} encoded to {} bytes",
        image.pass,
        png_data.len()
    );
    Ok(png_data)
}

/// PNG exporter for composites
///
/// ```
/// use engrave_core::traits::Exporter;
/// use engrave_export::PngExporter;
///
/// let exporter = PngExporter::new();
/// assert_eq!(exporter.extension(), "png");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PngExporter;

impl PngExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for PngExporter {
    fn name(&self) -> &'static str {
        "png"
    }

    fn export(&self, image: &CompositeImage) -> Result<Vec<u8>> {
        encode_png(image)
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

/// Export and write to `path` in one step
pub fn write_to_file(
    exporter: &dyn Exporter,
    image: &CompositeImage,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = exporter.export(image)?;
    std::fs::write(path, &bytes)
        .map_err(|e| ExportError::WriteFailed(format!("{}: {}", path.display(), e)))?;
    log::info!(
        "Wrote {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        exporter.mime_type()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engrave_core::{error::EngraveError, PassId};

    fn composite(width: u32, height: u32, data: Vec<u8>) -> CompositeImage {
        CompositeImage {
            width,
            height,
            pass: PassId::default(),
            data,
        }
    }

    #[test]
    fn test_png_exporter_metadata() {
        let exporter = PngExporter::new();
        assert_eq!(exporter.name(), "png");
        assert_eq!(exporter.extension(), "png");
        assert_eq!(exporter.mime_type(), "image/png");
    }

    #[test]
    fn test_png_keeps_pixels_and_alpha() {
        let data = vec![
            255, 0, 0, 255, // red
            0, 255, 0, 128, // half green
            0, 0, 255, 0, // clear
            255, 255, 255, 255, // white
        ];
        let png = PngExporter::new()
            .export(&composite(2, 2, data.clone()))
            .unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.as_raw(), &data);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let err = encode_png(&composite(4, 4, vec![0; 10])).unwrap_err();
        assert!(matches!(
            err,
            EngraveError::ExportFailed(ExportError::EncodingFailed(_))
        ));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        assert!(encode_png(&composite(0, 5, Vec::new())).is_err());
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("engrave-export-missing-dir")
            .join("nested")
            .join("out.png");
        let err = write_to_file(&PngExporter, &composite(1, 1, vec![0; 4]), &path).unwrap_err();
        assert!(matches!(
            err,
            EngraveError::ExportFailed(ExportError::WriteFailed(_))
        ));
    }
}
