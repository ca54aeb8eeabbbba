//! Size filter applied to every extracted image.

use crate::types::{ExtractedImage, FilterCriteria};

/// Pure predicate over image dimensions and stored byte size.
///
/// Bounds are inclusive, so widening any bound never rejects an image that
/// was previously accepted.
pub fn accepts(image: &ExtractedImage, criteria: &FilterCriteria) -> bool {
    accepts_dims(image.width, image.height, image.byte_size, criteria)
}

/// [`accepts`] on raw values, for callers that have not built an image yet.
pub fn accepts_dims(width: u32, height: u32, byte_size: u64, criteria: &FilterCriteria) -> bool {
    if width < criteria.min_width || height < criteria.min_height {
        return false;
    }
    if criteria.max_width.is_some_and(|max| width > max) {
        return false;
    }
    if criteria.max_height.is_some_and(|max| height > max) {
        return false;
    }
    if byte_size < criteria.min_size_bytes {
        return false;
    }
    if criteria.max_size_bytes.is_some_and(|max| byte_size > max) {
        return false;
    }
    true
}
