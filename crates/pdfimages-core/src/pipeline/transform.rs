//! Scaling and re-encoding of extracted images.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::borrow::Cow;
use std::io::Cursor;

use crate::config::OutputFormat;
use crate::types::ExtractedImage;

/// Encoded output for one image.
#[derive(Debug)]
pub struct Encoded {
    /// File contents
    pub bytes: Vec<u8>,
    /// Final pixel dimensions
    pub width: u32,
    pub height: u32,
    /// The original stream bytes were written unchanged
    pub preserved: bool,
}

/// Applies the configured scale factor and encoder quality.
#[derive(Debug, Clone)]
pub struct Transformer {
    scale: f64,
    quality: u8,
    format: OutputFormat,
}

impl Transformer {
    /// Create a transformer. `quality` is clamped to 1..=100.
    pub fn new(scale: f64, quality: u32, format: OutputFormat) -> Self {
        Self {
            scale,
            quality: quality.clamp(1, 100) as u8,
            format,
        }
    }

    /// Whether pixels pass through untouched.
    pub fn is_noop(&self) -> bool {
        (self.scale - 1.0).abs() < f64::EPSILON && (self.quality == 100 || !self.format.is_lossy())
    }

    /// Target size for a `width` x `height` source.
    pub fn target_dims(&self, width: u32, height: u32) -> (u32, u32) {
        let scaled = |v: u32| ((f64::from(v) * self.scale).round() as u32).max(1);
        (scaled(width), scaled(height))
    }

    /// Resample with Lanczos3 unless the scale is 1.
    pub fn scale<'a>(&self, image: &'a DynamicImage) -> Cow<'a, DynamicImage> {
        let (w, h) = self.target_dims(image.width(), image.height());
        if (w, h) == (image.width(), image.height()) {
            return Cow::Borrowed(image);
        }
        Cow::Owned(image.resize_exact(w, h, FilterType::Lanczos3))
    }

    /// Produce the file contents for `image`.
    pub fn apply(&self, image: &ExtractedImage) -> Result<Encoded, String> {
        if self.is_noop() {
            if let Some(source) = image
                .encoded
                .as_ref()
                .filter(|s| s.format == self.format.image_format())
            {
                return Ok(Encoded {
                    bytes: source.bytes.clone(),
                    width: image.width,
                    height: image.height,
                    preserved: true,
                });
            }
        }

        let scaled = self.scale(&image.image);
        let bytes = self.encode(&scaled)?;
        Ok(Encoded {
            bytes,
            width: scaled.width(),
            height: scaled.height(),
            preserved: false,
        })
    }

    /// Encode pixels in the target format.
    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, String> {
        let mut buffer = Cursor::new(Vec::new());
        if self.format.is_lossy() {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, self.quality))
                .map_err(|e| format!("JPEG encode failed: {}", e))?;
        } else {
            let format = self.format.image_format();
            let result = match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => {
                    image.write_to(&mut buffer, format)
                }
                _ => DynamicImage::ImageRgba8(image.to_rgba8()).write_to(&mut buffer, format),
            };
            result.map_err(|e| format!("{} encode failed: {}", self.format, e))?;
        }
        Ok(buffer.into_inner())
    }
}
