//! Near-duplicate detection within one PDF.
//!
//! Images are grouped in discovery order. Each new image is compared with
//! the representative of every existing group (not with every earlier
//! image), and the first image seen in a group stays its representative.
//! Because representatives are pairwise distinct, feeding the survivors back
//! through the deduplicator returns them unchanged.

use std::collections::HashMap;

use super::fingerprint::Fingerprint;
use crate::types::{DedupConfig, ExtractedImage};

/// Result of admitting one image into a [`DedupIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The image starts a new group and is its representative.
    Representative { group: usize },
    /// The image duplicates the representative of `group`.
    Duplicate { group: usize },
}

impl Admission {
    /// Group the image was assigned to.
    pub fn group(self) -> usize {
        match self {
            Self::Representative { group } | Self::Duplicate { group } => group,
        }
    }

    /// Whether the image should be kept.
    pub fn is_representative(self) -> bool {
        matches!(self, Self::Representative { .. })
    }
}

/// Symmetric duplicate predicate.
///
/// At a threshold of 1.0 only identical pixel buffers match. Below that,
/// identical buffers always match and otherwise both the perceptual
/// similarity and the mean luminance must be within tolerance.
pub fn is_duplicate(a: &Fingerprint, b: &Fingerprint, threshold: f64) -> bool {
    if a.same_content(b) {
        return true;
    }
    if threshold >= 1.0 {
        return false;
    }
    let luma_tolerance = (1.0 - threshold.max(0.0)) * 255.0;
    let luma_delta = f64::from(a.mean_luma().abs_diff(b.mean_luma()));
    a.similarity(b) >= threshold && luma_delta <= luma_tolerance
}

/// Incremental group index over the representatives seen so far.
///
/// Only fingerprints are retained, so the pipeline can write each
/// representative as soon as it is admitted.
#[derive(Debug)]
pub struct DedupIndex {
    config: DedupConfig,
    representatives: Vec<Fingerprint>,
    members: Vec<usize>,
    exact: HashMap<[u8; 32], usize>,
}

impl DedupIndex {
    /// Create an empty index.
    pub fn new(config: DedupConfig) -> Self {
        Self {
            config,
            representatives: Vec::new(),
            members: Vec::new(),
            exact: HashMap::new(),
        }
    }

    /// Assign `fingerprint` to a group.
    ///
    /// With deduplication disabled every image becomes its own group.
    pub fn admit(&mut self, fingerprint: &Fingerprint) -> Admission {
        if self.config.enabled {
            if let Some(group) = self.find_group(fingerprint) {
                self.members[group] += 1;
                return Admission::Duplicate { group };
            }
        }

        let group = self.representatives.len();
        self.representatives.push(fingerprint.clone());
        self.members.push(1);
        self.exact.entry(*fingerprint.content_hash()).or_insert(group);
        Admission::Representative { group }
    }

    fn find_group(&self, fingerprint: &Fingerprint) -> Option<usize> {
        if let Some(&group) = self.exact.get(fingerprint.content_hash()) {
            return Some(group);
        }

        // Several representatives may match; take the closest one and
        // break ties by creation order.
        let threshold = self.config.similarity_threshold;
        self.representatives
            .iter()
            .enumerate()
            .filter(|(_, rep)| is_duplicate(rep, fingerprint, threshold))
            .min_by_key(|(group, rep)| (rep.distance(fingerprint), *group))
            .map(|(group, _)| group)
    }

    /// Number of groups so far.
    pub fn group_count(&self) -> usize {
        self.representatives.len()
    }

    /// Member count of each group, in creation order.
    pub fn group_sizes(&self) -> &[usize] {
        &self.members
    }
}

/// Output of [`Deduplicator::run`].
#[derive(Debug)]
pub struct DedupOutcome {
    /// Representatives in discovery order
    pub kept: Vec<ExtractedImage>,
    /// Number of images dropped as duplicates
    pub duplicates: usize,
    /// Member count of each group (parallel to `kept`)
    pub group_sizes: Vec<usize>,
}

/// Batch front-end over [`DedupIndex`].
#[derive(Debug, Clone)]
pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    /// Create a deduplicator with the given settings.
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Whether two images would land in the same group.
    pub fn dup(&self, a: &ExtractedImage, b: &ExtractedImage) -> bool {
        self.config.enabled
            && is_duplicate(
                &a.fingerprint,
                &b.fingerprint,
                self.config.similarity_threshold,
            )
    }

    /// Keep one representative per group.
    ///
    /// Input is ordered by discovery (page, then index); the first image of
    /// each group survives.
    pub fn run(&self, images: Vec<ExtractedImage>) -> DedupOutcome {
        let mut index = DedupIndex::new(self.config);
        let mut kept = Vec::new();
        let mut duplicates = 0;

        for image in images {
            match index.admit(&image.fingerprint) {
                Admission::Representative { .. } => kept.push(image),
                Admission::Duplicate { group } => {
                    tracing::debug!(
                        "Page {} image {} duplicates group {}",
                        image.page,
                        image.index,
                        group
                    );
                    duplicates += 1;
                }
            }
        }

        DedupOutcome {
            kept,
            duplicates,
            group_sizes: index.group_sizes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fingerprint::Fingerprinter;
    use crate::types::ImageOrigin;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::path::PathBuf;

    fn pattern(seed: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(200, 200, |x, y| {
            let on = match seed % 4 {
                0 => (x / 20 + y / 20) % 2 == 0,
                1 => x < 100,
                2 => y < 100,
                _ => (x / 50) % 2 == 0,
            };
            let shift = (seed / 4 * 40) as u8;
            if on {
                Rgb([230u8.saturating_sub(shift), 200, 180])
            } else {
                Rgb([20, 40u8.saturating_add(shift), 60])
            }
        }))
    }

    fn extracted(page: u32, index: u32, image: DynamicImage) -> ExtractedImage {
        let fingerprint = Fingerprinter::new().fingerprint(&image);
        ExtractedImage {
            source_pdf: PathBuf::from("test.pdf"),
            page,
            index,
            width: image.width(),
            height: image.height(),
            byte_size: 4096,
            origin: ImageOrigin::PageImage,
            image,
            encoded: None,
            fingerprint,
        }
    }

    fn config(threshold: f64) -> DedupConfig {
        DedupConfig {
            enabled: true,
            similarity_threshold: threshold,
        }
    }

    #[test]
    fn test_identical_images_collapse_at_threshold_one() {
        let dedup = Deduplicator::new(config(1.0));
        let out = dedup.run(vec![
            extracted(1, 0, pattern(0)),
            extracted(2, 0, pattern(0)),
        ]);
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.duplicates, 1);
        assert_eq!(out.kept[0].position(), (1, 0));
    }

    #[test]
    fn test_threshold_one_keeps_near_duplicates_apart() {
        let a = pattern(0);
        let mut b = a.to_rgb8();
        b.put_pixel(3, 3, Rgb([0, 0, 0]));
        let dedup = Deduplicator::new(config(1.0));
        let out = dedup.run(vec![
            extracted(1, 0, a),
            extracted(1, 1, DynamicImage::ImageRgb8(b)),
        ]);
        assert_eq!(out.kept.len(), 2);
    }

    #[test]
    fn test_near_duplicate_collapses_at_default_threshold() {
        let a = pattern(0);
        let mut b = a.to_rgb8();
        b.put_pixel(3, 3, Rgb([0, 0, 0]));
        let dedup = Deduplicator::new(config(0.95));
        let out = dedup.run(vec![
            extracted(1, 0, a),
            extracted(1, 1, DynamicImage::ImageRgb8(b)),
        ]);
        assert_eq!(out.kept.len(), 1);
    }

    #[test]
    fn test_threshold_zero_collapses_everything() {
        let dedup = Deduplicator::new(config(0.0));
        let images = (0..6).map(|i| extracted(1, i, pattern(i))).collect();
        let out = dedup.run(images);
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.duplicates, 5);
        assert_eq!(out.group_sizes, vec![6]);
    }

    #[test]
    fn test_disabled_is_identity() {
        let dedup = Deduplicator::new(DedupConfig {
            enabled: false,
            similarity_threshold: 0.0,
        });
        let images = vec![
            extracted(1, 0, pattern(0)),
            extracted(1, 1, pattern(0)),
            extracted(2, 0, pattern(1)),
        ];
        let out = dedup.run(images);
        assert_eq!(out.kept.len(), 3);
        assert_eq!(out.duplicates, 0);
    }

    #[test]
    fn test_two_page_scenario_yields_two_groups() {
        // Page 1: unique A + copy of B. Page 2: unique B + copy of A.
        let dedup = Deduplicator::new(config(0.95));
        let out = dedup.run(vec![
            extracted(1, 0, pattern(0)),
            extracted(1, 1, pattern(1)),
            extracted(2, 0, pattern(1)),
            extracted(2, 1, pattern(0)),
        ]);
        assert_eq!(out.kept.len(), 2);
        assert_eq!(out.kept[0].position(), (1, 0));
        assert_eq!(out.kept[1].position(), (1, 1));
        assert_eq!(out.group_sizes, vec![2, 2]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let dedup = Deduplicator::new(config(0.9));
        let images: Vec<_> = (0..8)
            .map(|i| extracted(i / 2 + 1, i % 2, pattern(i % 5)))
            .collect();
        let first = dedup.run(images);
        let positions: Vec<_> = first.kept.iter().map(|i| i.position()).collect();
        let second = dedup.run(first.kept);
        let again: Vec<_> = second.kept.iter().map(|i| i.position()).collect();
        assert_eq!(positions, again);
        assert_eq!(second.duplicates, 0);
    }

    #[test]
    fn test_dup_is_symmetric() {
        let dedup = Deduplicator::new(config(0.8));
        let images: Vec<_> = (0..6).map(|i| extracted(1, i, pattern(i))).collect();
        for a in &images {
            for b in &images {
                assert_eq!(dedup.dup(a, b), dedup.dup(b, a));
            }
        }
    }

    #[test]
    fn test_luma_guard_separates_flat_images() {
        let fp = Fingerprinter::new();
        let black = fp.fingerprint(&DynamicImage::new_rgb8(64, 64));
        let white = fp.fingerprint(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
            64,
            64,
            Rgb([255, 255, 255]),
        )));
        assert!(!is_duplicate(&black, &white, 0.95));
        assert!(is_duplicate(&black, &white, 0.0));
    }

    #[test]
    fn test_index_admission_groups() {
        let fp = Fingerprinter::new();
        let mut index = DedupIndex::new(config(0.95));
        let a = fp.fingerprint(&pattern(0));
        let b = fp.fingerprint(&pattern(1));
        assert_eq!(index.admit(&a), Admission::Representative { group: 0 });
        assert_eq!(index.admit(&b), Admission::Representative { group: 1 });
        assert_eq!(index.admit(&a), Admission::Duplicate { group: 0 });
        assert_eq!(index.group_count(), 2);
        assert_eq!(index.group_sizes(), &[2, 1]);
    }
}
