//! Content and perceptual fingerprints for image deduplication.

use blake3::Hasher as Blake3Hasher;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig, ImageHash};

/// Fixed-width fingerprint of an image's pixels.
///
/// Combines an exact content hash (dimensions + pixel bytes), a perceptual
/// gradient hash and the mean luminance. Two fingerprints of the same pixel
/// buffer are always equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    content: [u8; 32],
    perceptual: ImageHash,
    mean_luma: u8,
}

impl Fingerprint {
    /// BLAKE3 digest of the dimensions and pixel bytes.
    pub fn content_hash(&self) -> &[u8; 32] {
        &self.content
    }

    /// Mean luminance of the image (0-255).
    pub fn mean_luma(&self) -> u8 {
        self.mean_luma
    }

    /// Number of bits in the perceptual hash.
    pub fn bit_len(&self) -> u32 {
        (self.perceptual.as_bytes().len() * 8) as u32
    }

    /// Hamming distance between the perceptual hashes.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        self.perceptual.dist(&other.perceptual)
    }

    /// Whether the underlying pixel buffers are byte-identical.
    pub fn same_content(&self, other: &Fingerprint) -> bool {
        self.content == other.content
    }

    /// Perceptual similarity in [0, 1]; 1.0 means identical hashes.
    pub fn similarity(&self, other: &Fingerprint) -> f64 {
        let bits = self.bit_len().max(other.bit_len());
        if bits == 0 {
            return if self.same_content(other) { 1.0 } else { 0.0 };
        }
        1.0 - f64::from(self.distance(other)) / f64::from(bits)
    }
}

/// Computes fingerprints.
///
/// The perceptual hasher is pre-configured once per instance to avoid
/// rebuilding the same `HasherConfig` for every image.
pub struct Fingerprinter {
    phash_hasher: image_hasher::Hasher,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter {
    /// Create a fingerprinter with a 16x16 double-gradient perceptual hash.
    pub fn new() -> Self {
        let phash_hasher = HasherConfig::new()
            .hash_alg(HashAlg::DoubleGradient)
            .hash_size(16, 16)
            .to_hasher();
        Self { phash_hasher }
    }

    /// Fingerprint an image. Pure: depends only on the pixel buffer.
    pub fn fingerprint(&self, image: &DynamicImage) -> Fingerprint {
        Fingerprint {
            content: Self::content_hash(image),
            perceptual: self.phash_hasher.hash_image(image),
            mean_luma: Self::mean_luma(image),
        }
    }

    /// BLAKE3 over width, height, color type and raw pixel bytes.
    pub fn content_hash(image: &DynamicImage) -> [u8; 32] {
        let mut hasher = Blake3Hasher::new();
        hasher.update(&image.width().to_le_bytes());
        hasher.update(&image.height().to_le_bytes());
        hasher.update(format!("{:?}", image.color()).as_bytes());
        hasher.update(image.as_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Mean luminance over a small thumbnail; stable across rescaled copies.
    fn mean_luma(image: &DynamicImage) -> u8 {
        let small = image.thumbnail(32, 32).to_luma8();
        let pixels = small.as_raw();
        if pixels.is_empty() {
            return 0;
        }
        let sum: u64 = pixels.iter().map(|&p| u64::from(p)).sum();
        (sum / pixels.len() as u64) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32, seed: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let v = ((x * 7 + y * 3 + seed * 31) % 256) as u8;
            Rgb([v, v.wrapping_mul(3), 255 - v])
        }))
    }

    #[test]
    fn test_fingerprint_consistency() {
        let fp = Fingerprinter::new();
        let img = gradient(100, 80, 1);
        assert_eq!(fp.fingerprint(&img), fp.fingerprint(&img));
    }

    #[test]
    fn test_distance_identical_is_zero() {
        let fp = Fingerprinter::new();
        let a = fp.fingerprint(&gradient(64, 64, 2));
        assert_eq!(a.distance(&a), 0);
        assert!((a.similarity(&a) - 1.0).abs() < f64::EPSILON);
        assert!(a.bit_len() > 0);
    }

    #[test]
    fn test_content_hash_changes_with_one_pixel() {
        let a = gradient(32, 32, 3);
        let mut b = a.to_rgb8();
        b.put_pixel(0, 0, Rgb([1, 2, 3]));
        let b = DynamicImage::ImageRgb8(b);
        assert_ne!(
            Fingerprinter::content_hash(&a),
            Fingerprinter::content_hash(&b)
        );
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let fp = Fingerprinter::new();
        let a = fp.fingerprint(&gradient(64, 64, 4));
        let b = fp.fingerprint(&gradient(64, 64, 9));
        assert_eq!(a.distance(&b), b.distance(&a));
        assert_eq!(a.similarity(&b), b.similarity(&a));
    }

    #[test]
    fn test_mean_luma_black_and_white() {
        let fp = Fingerprinter::new();
        let black = fp.fingerprint(&DynamicImage::new_rgb8(16, 16));
        let white = fp.fingerprint(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
            16,
            16,
            Rgb([255, 255, 255]),
        )));
        assert_eq!(black.mean_luma(), 0);
        assert_eq!(white.mean_luma(), 255);
    }
}
