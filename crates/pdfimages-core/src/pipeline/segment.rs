//! Region detection on page-sized scans.
//!
//! A scanned page arrives as one image XObject even when it shows several
//! pictures. When the border of such an image is a uniform background, the
//! foreground is binned into cells and the 8-connected cell components
//! become separate regions.

use std::collections::VecDeque;

use image::{DynamicImage, GrayImage};

/// Luminance difference from the background that counts as foreground.
const FOREGROUND_DELTA: u8 = 40;

/// Share of border pixels that must match the background.
const UNIFORM_BORDER_RATIO: f64 = 0.97;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Tuning for region detection.
#[derive(Debug, Clone, Copy)]
pub struct SegmentOptions {
    /// Regions narrower or shorter than this are dropped
    pub min_side: u32,
    /// Cell size; foreground closer than this merges into one region
    pub cell: u32,
    /// Minimum share of foreground pixels inside a region's box
    pub min_fill: f64,
}

impl SegmentOptions {
    /// Derive sizes from the resolution hint: 0.1 inch minimum side,
    /// 0.05 inch merge gap.
    pub fn from_dpi(dpi: u32) -> Self {
        Self {
            min_side: (dpi / 10).max(8),
            cell: (dpi / 20).max(4),
            min_fill: 0.25,
        }
    }
}

/// Find picture regions inside `image`.
///
/// Returns an empty list when the border is not a uniform background.
/// Regions are ordered top-to-bottom, then left-to-right.
pub fn find_regions(image: &DynamicImage, options: &SegmentOptions) -> Vec<Rect> {
    let luma = image.to_luma8();
    let (width, height) = luma.dimensions();
    if width < 3 || height < 3 {
        return vec![];
    }

    let Some(background) = uniform_border(&luma) else {
        return vec![];
    };

    let cell = options.cell.max(1);
    let cols = width.div_ceil(cell) as usize;
    let rows = height.div_ceil(cell) as usize;

    let is_fg = |v: u8| v.abs_diff(background) > FOREGROUND_DELTA;

    let mut occupied = vec![false; cols * rows];
    for (x, y, p) in luma.enumerate_pixels() {
        if is_fg(p.0[0]) {
            occupied[(y / cell) as usize * cols + (x / cell) as usize] = true;
        }
    }

    let mut regions = Vec::new();
    let mut visited = vec![false; cols * rows];
    let mut queue = VecDeque::new();

    for start in 0..occupied.len() {
        if !occupied[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);

        let (mut min_c, mut min_r) = (usize::MAX, usize::MAX);
        let (mut max_c, mut max_r) = (0usize, 0usize);

        while let Some(idx) = queue.pop_front() {
            let (c, r) = (idx % cols, idx / cols);
            min_c = min_c.min(c);
            min_r = min_r.min(r);
            max_c = max_c.max(c);
            max_r = max_r.max(r);

            for dr in -1i64..=1 {
                for dc in -1i64..=1 {
                    let (nc, nr) = (c as i64 + dc, r as i64 + dr);
                    if nc < 0 || nr < 0 || nc >= cols as i64 || nr >= rows as i64 {
                        continue;
                    }
                    let n = nr as usize * cols + nc as usize;
                    if occupied[n] && !visited[n] {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }

        let x = min_c as u32 * cell;
        let y = min_r as u32 * cell;
        let rect = Rect {
            x,
            y,
            width: ((max_c as u32 + 1) * cell).min(width) - x,
            height: ((max_r as u32 + 1) * cell).min(height) - y,
        };
        if rect.width < options.min_side || rect.height < options.min_side {
            continue;
        }
        let tight = tighten(&luma, rect, &is_fg);
        if fill_ratio(&luma, tight, &is_fg) >= options.min_fill {
            regions.push(tight);
        }
    }

    regions.sort_by_key(|r| (r.y, r.x));
    regions
}

/// Split `image` into its regions when it holds at least two of them.
pub fn split(image: &DynamicImage, options: &SegmentOptions) -> Option<Vec<(Rect, DynamicImage)>> {
    let regions = find_regions(image, options);
    if regions.len() < 2 {
        return None;
    }
    Some(
        regions
            .into_iter()
            .map(|r| (r, image.crop_imm(r.x, r.y, r.width, r.height)))
            .collect(),
    )
}

/// Mean border luminance if the border is uniform.
fn uniform_border(luma: &GrayImage) -> Option<u8> {
    let (w, h) = luma.dimensions();
    let mut border = Vec::with_capacity(2 * (w + h) as usize);
    for x in 0..w {
        border.push(luma.get_pixel(x, 0).0[0]);
        border.push(luma.get_pixel(x, h - 1).0[0]);
    }
    for y in 1..h - 1 {
        border.push(luma.get_pixel(0, y).0[0]);
        border.push(luma.get_pixel(w - 1, y).0[0]);
    }

    let sum: u64 = border.iter().map(|&v| u64::from(v)).sum();
    let mean = (sum / border.len() as u64) as u8;
    let matching = border
        .iter()
        .filter(|&&v| v.abs_diff(mean) <= FOREGROUND_DELTA / 2)
        .count();
    (matching as f64 / border.len() as f64 >= UNIFORM_BORDER_RATIO).then_some(mean)
}

/// Shrink a cell-aligned box to the exact foreground extent.
fn tighten(luma: &GrayImage, rect: Rect, is_fg: &impl Fn(u8) -> bool) -> Rect {
    let (mut x0, mut y0) = (u32::MAX, u32::MAX);
    let (mut x1, mut y1) = (0, 0);
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            if is_fg(luma.get_pixel(x, y).0[0]) {
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x);
                y1 = y1.max(y);
            }
        }
    }
    if x0 > x1 {
        return rect;
    }
    Rect {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    }
}

fn fill_ratio(luma: &GrayImage, rect: Rect, is_fg: &impl Fn(u8) -> bool) -> f64 {
    if rect.area() == 0 {
        return 0.0;
    }
    let mut count = 0u64;
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            if is_fg(luma.get_pixel(x, y).0[0]) {
                count += 1;
            }
        }
    }
    count as f64 / rect.area() as f64
}
