//! Image extraction from PDF documents using `lopdf`.
//!
//! Pages are walked in order. On each page the content stream is decoded and
//! every `Do` operator is followed, so images come out in drawing order.
//! Form XObjects are descended into (cycle-safe) and their images are tagged
//! as [`ImageOrigin::FormImage`].
//!
//! The current transformation matrix is tracked through `q`/`Q`/`cm` so the
//! placement of each drawn image is known. Only images painted over most of
//! the page's MediaBox are treated as page scans and offered to the region
//! segmenter.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::fingerprint::Fingerprinter;
use super::segment::{self, SegmentOptions};
use crate::error::{PipelineError, PipelineResult};
use crate::types::{EncodedSource, ExtractedImage, ImageOrigin, ObjectKind, ObjectKinds};

/// Share of the page area an image must cover to be treated as a page scan.
const PAGE_SCAN_COVERAGE: f64 = 0.9;

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Settings for [`ImageExtractor`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Resolution hint driving region detection granularity
    pub dpi: u32,
    /// Object kinds to extract
    pub kinds: ObjectKinds,
    /// Split page-sized scans into their picture regions
    pub split_regions: bool,
    /// Images wider or taller than this are skipped
    pub max_image_dimension: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            kinds: ObjectKinds::all(),
            split_regions: true,
            max_image_dimension: 20000,
        }
    }
}

/// Opens PDFs and yields their embedded images.
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    options: ExtractOptions,
}

impl ImageExtractor {
    /// Create an extractor with the given options.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Open `path` and return a lazy iterator over its images.
    ///
    /// Fails with [`PipelineError::UnreadablePdf`] when the file cannot be
    /// parsed, is encrypted with a non-empty password, or has no pages.
    pub fn open(&self, path: &Path) -> PipelineResult<PdfImages> {
        let unreadable = |message: String| PipelineError::UnreadablePdf {
            path: path.to_path_buf(),
            message,
        };

        let mut doc = Document::load(path).map_err(|e| unreadable(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(unreadable("encrypted and requires a password".into()));
            }
            tracing::debug!("Decrypted {:?} with empty password", path);
        }

        let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
        if pages.is_empty() {
            return Err(unreadable("document has no pages".into()));
        }

        if self.options.kinds.contains(ObjectKind::Text) {
            tracing::debug!("Text objects requested for {:?}; text is not extracted", path);
        }

        tracing::debug!("Opened {:?} ({} pages)", path, pages.len());

        Ok(PdfImages {
            path: path.to_path_buf(),
            doc,
            pages: pages.into(),
            pending: VecDeque::new(),
            options: self.options.clone(),
            fingerprinter: Fingerprinter::new(),
        })
    }
}

/// Lazy, single-pass sequence of the images in one PDF.
///
/// Decoding happens a page at a time as the iterator advances. Per-image
/// failures are yielded as `Err` items and do not end the sequence.
pub struct PdfImages {
    path: PathBuf,
    doc: Document,
    pages: VecDeque<(u32, ObjectId)>,
    pending: VecDeque<PipelineResult<ExtractedImage>>,
    options: ExtractOptions,
    fingerprinter: Fingerprinter,
}

impl PdfImages {
    fn load_page(&mut self, page: u32, page_id: ObjectId) {
        if !self.options.kinds.wants_images() {
            return;
        }
        let refs = self.page_image_refs(page_id);
        tracing::trace!("Page {}: {} image reference(s)", page, refs.len());

        let mut index = 0u32;
        for image_ref in refs {
            if !self.options.kinds.contains(image_ref.origin.kind()) {
                continue;
            }
            let stream = match self.doc.get_object(image_ref.id) {
                Ok(Object::Stream(s)) => s,
                _ => continue,
            };
            match decode_image(&self.doc, stream, &self.path, page, &self.options) {
                Ok(Some(decoded)) => {
                    for image in self.build_images(page, &mut index, &image_ref, decoded) {
                        self.pending.push_back(Ok(image));
                    }
                }
                Ok(None) => {}
                Err(e) => self.pending.push_back(Err(e)),
            }
        }
    }

    fn build_images(
        &self,
        page: u32,
        index: &mut u32,
        image_ref: &ImageRef,
        decoded: DecodedImage,
    ) -> Vec<ExtractedImage> {
        let origin = image_ref.origin;
        if self.options.split_regions && origin == ImageOrigin::PageImage && image_ref.covers_page {
            let seg = SegmentOptions::from_dpi(self.options.dpi);
            if let Some(parts) = segment::split(&decoded.image, &seg) {
                tracing::debug!("Page {}: scan split into {} regions", page, parts.len());
                let total = u64::from(decoded.image.width()) * u64::from(decoded.image.height());
                return parts
                    .into_iter()
                    .map(|(rect, image)| {
                        let byte_size = (decoded.byte_size * rect.area() / total.max(1)).max(1);
                        self.make(page, index, ImageOrigin::ScanRegion, image, byte_size, None)
                    })
                    .collect();
            }
        }
        vec![self.make(
            page,
            index,
            origin,
            decoded.image,
            decoded.byte_size,
            decoded.encoded,
        )]
    }

    fn make(
        &self,
        page: u32,
        index: &mut u32,
        origin: ImageOrigin,
        image: DynamicImage,
        byte_size: u64,
        encoded: Option<EncodedSource>,
    ) -> ExtractedImage {
        let fingerprint = self.fingerprinter.fingerprint(&image);
        let extracted = ExtractedImage {
            source_pdf: self.path.clone(),
            page,
            index: *index,
            width: image.width(),
            height: image.height(),
            byte_size,
            origin,
            image,
            encoded,
            fingerprint,
        };
        *index += 1;
        extracted
    }

    /// Image XObjects drawn by a page, in drawing order.
    fn page_image_refs(&self, page_id: ObjectId) -> Vec<ImageRef> {
        let resources = page_resources(&self.doc, page_id);
        let mut walker = Walker {
            doc: &self.doc,
            page_resources: resources.clone(),
            page_box: page_media_box(&self.doc, page_id),
            seen_forms: HashSet::new(),
            emitted: HashMap::new(),
            out: Vec::new(),
        };

        match self.doc.get_page_content(page_id) {
            Ok(content) if !content.is_empty() => walker.walk(
                &content,
                resources.as_ref(),
                ImageOrigin::PageImage,
                Matrix::IDENTITY,
            ),
            Ok(_) => {
                tracing::debug!("Page has no content stream; using resource order");
                walker.walk_resources(resources.as_ref(), ImageOrigin::PageImage);
            }
            Err(e) => {
                tracing::debug!("Page content unavailable ({}); using resource order", e);
                walker.walk_resources(resources.as_ref(), ImageOrigin::PageImage);
            }
        }
        walker.out
    }
}

impl Iterator for PdfImages {
    type Item = PipelineResult<ExtractedImage>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            let (page, page_id) = self.pages.pop_front()?;
            self.load_page(page, page_id);
        }
    }
}

/// One image XObject drawn by a page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ImageRef {
    id: ObjectId,
    origin: ImageOrigin,
    /// Drawn over most of the page's MediaBox
    covers_page: bool,
}

/// Affine transform `[a b c d e f]` as written by the `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() != 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, operand) in m.iter_mut().zip(operands) {
            *slot = f64::from(operand.as_float().ok()?);
        }
        Some(Self(m))
    }

    /// `self` applied first, then `outer`.
    fn then(self, outer: Self) -> Self {
        let [a, b, c, d, e, f] = self.0;
        let [oa, ob, oc, od, oe, of] = outer.0;
        Self([
            a * oa + b * oc,
            a * ob + b * od,
            c * oa + d * oc,
            c * ob + d * od,
            e * oa + f * oc + oe,
            e * ob + f * od + of,
        ])
    }

    fn apply(self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Bounding box `[x0, y0, x1, y1]` of the unit square, where images are painted.
    fn unit_square_bounds(self) -> [f64; 4] {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        corners.iter().fold(
            [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
            |[x0, y0, x1, y1], &(x, y)| [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
        )
    }
}

/// Fraction of `page` covered by `bounds` (both `[x0, y0, x1, y1]`).
fn page_coverage(bounds: [f64; 4], page: [f64; 4]) -> f64 {
    let page_area = (page[2] - page[0]) * (page[3] - page[1]);
    if page_area.is_nan() || page_area <= 0.0 {
        return 0.0;
    }
    let w = (bounds[2].min(page[2]) - bounds[0].max(page[0])).max(0.0);
    let h = (bounds[3].min(page[3]) - bounds[1].max(page[1])).max(0.0);
    (w * h / page_area).min(1.0)
}

/// Collects image references while walking content streams.
struct Walker<'a> {
    doc: &'a Document,
    page_resources: Option<Dictionary>,
    page_box: [f64; 4],
    seen_forms: HashSet<ObjectId>,
    emitted: HashMap<ObjectId, usize>,
    out: Vec<ImageRef>,
}

impl Walker<'_> {
    fn walk(
        &mut self,
        content: &[u8],
        resources: Option<&Dictionary>,
        origin: ImageOrigin,
        base: Matrix,
    ) {
        let xobjects = xobject_refs(self.doc, resources);
        let operations = match Content::decode(content) {
            Ok(c) => c.operations,
            Err(e) => {
                tracing::debug!("Content stream decode failed ({}); using resource order", e);
                self.walk_resources(resources, origin);
                return;
            }
        };

        let mut ctm = base;
        let mut saved = Vec::new();
        for op in &operations {
            match op.operator.as_str() {
                "q" => saved.push(ctm),
                // An unbalanced Q leaves the state as it is.
                "Q" => ctm = saved.pop().unwrap_or(ctm),
                "cm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        ctm = m.then(ctm);
                    }
                }
                "Do" => {
                    let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) else {
                        continue;
                    };
                    if let Some((_, id)) = xobjects.iter().find(|(n, _)| n.as_slice() == name) {
                        self.visit(*id, origin, Some(ctm));
                    }
                }
                _ => {}
            }
        }
    }

    /// Placement is unknown here, so nothing counts as a page scan.
    fn walk_resources(&mut self, resources: Option<&Dictionary>, origin: ImageOrigin) {
        for (_, id) in xobject_refs(self.doc, resources) {
            self.visit(id, origin, None);
        }
    }

    fn visit(&mut self, id: ObjectId, origin: ImageOrigin, ctm: Option<Matrix>) {
        let stream = match self.doc.get_object(id) {
            Ok(Object::Stream(s)) => s,
            _ => return,
        };
        match subtype(&stream.dict) {
            Some(b"Image") => {
                if is_image_mask(&stream.dict) {
                    return;
                }
                let covers_page = ctm.is_some_and(|m| {
                    page_coverage(m.unit_square_bounds(), self.page_box) >= PAGE_SCAN_COVERAGE
                });
                match self.emitted.get(&id) {
                    Some(&slot) => self.out[slot].covers_page |= covers_page,
                    None => {
                        self.emitted.insert(id, self.out.len());
                        self.out.push(ImageRef {
                            id,
                            origin,
                            covers_page,
                        });
                    }
                }
            }
            Some(b"Form") => {
                if !self.seen_forms.insert(id) {
                    return;
                }
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| as_dictionary(self.doc, r))
                    .or_else(|| self.page_resources.clone());
                let content = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|m| m.as_array().ok())
                    .and_then(|m| Matrix::from_operands(m))
                    .unwrap_or(Matrix::IDENTITY);
                let base = form_matrix.then(ctm.unwrap_or(Matrix::IDENTITY));
                self.walk(&content, form_resources.as_ref(), ImageOrigin::FormImage, base);
            }
            _ => {}
        }
    }
}

/// Raw decode result before fingerprinting.
struct DecodedImage {
    image: DynamicImage,
    byte_size: u64,
    encoded: Option<EncodedSource>,
}

/// Decode one image XObject.
///
/// Returns `Ok(None)` for streams that are not pictures (stencil masks).
fn decode_image(
    doc: &Document,
    stream: &Stream,
    path: &Path,
    page: u32,
    options: &ExtractOptions,
) -> PipelineResult<Option<DecodedImage>> {
    let dict = &stream.dict;
    let decode_err = |message: String| PipelineError::Decode {
        path: path.to_path_buf(),
        page,
        message,
    };

    let width = dict_u32(dict, b"Width").ok_or_else(|| decode_err("missing /Width".into()))?;
    let height = dict_u32(dict, b"Height").ok_or_else(|| decode_err("missing /Height".into()))?;
    if width == 0 || height == 0 {
        return Err(decode_err(format!("empty image {}x{}", width, height)));
    }
    if width > options.max_image_dimension || height > options.max_image_dimension {
        return Err(PipelineError::ImageTooLarge {
            path: path.to_path_buf(),
            page,
            width,
            height,
            max_dim: options.max_image_dimension,
        });
    }

    let byte_size = stream.content.len() as u64;
    let filters = filter_names(dict);

    if let Some(unsupported) = filters.iter().find(|f| {
        matches!(
            f.as_slice(),
            b"JPXDecode" | b"CCITTFaxDecode" | b"CCF" | b"JBIG2Decode"
        )
    }) {
        return Err(PipelineError::UnsupportedImage {
            path: path.to_path_buf(),
            page,
            encoding: String::from_utf8_lossy(unsupported).into_owned(),
        });
    }

    if filters.last().is_some_and(|f| f == b"DCTDecode" || f == b"DCT") {
        if filters.len() > 1 {
            return Err(PipelineError::UnsupportedImage {
                path: path.to_path_buf(),
                page,
                encoding: "chained DCTDecode".into(),
            });
        }
        let image = image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .map_err(|e| decode_err(format!("JPEG: {}", e)))?;
        tracing::trace!("Page {}: JPEG {}x{}", page, image.width(), image.height());
        return Ok(Some(DecodedImage {
            image,
            byte_size,
            encoded: Some(EncodedSource {
                bytes: stream.content.clone(),
                format: ImageFormat::Jpeg,
            }),
        }));
    }

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| decode_err(format!("stream decompression failed: {}", e)))?
    };

    let bits = dict_u32(dict, b"BitsPerComponent").unwrap_or(8);
    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .map(|cs| resolve_color_space(doc, cs))
        .unwrap_or(ColorSpace::Gray);
    let invert = decode_inverted(dict);

    let image = raw_to_image(&data, width, height, bits, &color_space, invert).map_err(decode_err)?;
    Ok(Some(DecodedImage {
        image,
        byte_size,
        encoded: None,
    }))
}

/// Color spaces we can turn into 8-bit pixels.
#[derive(Debug, Clone, PartialEq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Indexed {
        base: Box<ColorSpace>,
        lookup: Vec<u8>,
    },
    Unsupported(String),
}

impl ColorSpace {
    fn components(&self) -> Option<u32> {
        match self {
            Self::Gray => Some(1),
            Self::Rgb => Some(3),
            Self::Cmyk => Some(4),
            Self::Indexed { .. } => Some(1),
            Self::Unsupported(_) => None,
        }
    }
}

fn resolve_color_space(doc: &Document, obj: &Object) -> ColorSpace {
    let obj = match doc.dereference(obj) {
        Ok((_, o)) => o,
        Err(_) => return ColorSpace::Unsupported("dangling reference".into()),
    };
    match obj {
        Object::Name(name) => color_space_by_name(name),
        Object::Array(items) => {
            let Some(family) = items.first().and_then(|o| o.as_name().ok()) else {
                return ColorSpace::Unsupported("empty array".into());
            };
            match family {
                b"ICCBased" => {
                    let n = items
                        .get(1)
                        .and_then(|o| doc.dereference(o).ok())
                        .and_then(|(_, o)| match o {
                            Object::Stream(s) => dict_u32(&s.dict, b"N"),
                            _ => None,
                        });
                    match n {
                        Some(1) => ColorSpace::Gray,
                        Some(3) => ColorSpace::Rgb,
                        Some(4) => ColorSpace::Cmyk,
                        other => ColorSpace::Unsupported(format!("ICCBased N={:?}", other)),
                    }
                }
                b"Indexed" | b"I" => {
                    let base = items
                        .get(1)
                        .map(|o| resolve_color_space(doc, o))
                        .unwrap_or(ColorSpace::Unsupported("Indexed without base".into()));
                    let lookup = items
                        .get(3)
                        .and_then(|o| doc.dereference(o).ok())
                        .and_then(|(_, o)| match o {
                            Object::String(bytes, _) => Some(bytes.clone()),
                            Object::Stream(s) => Some(
                                s.decompressed_content()
                                    .unwrap_or_else(|_| s.content.clone()),
                            ),
                            _ => None,
                        });
                    match lookup {
                        Some(lookup) if !matches!(base, ColorSpace::Unsupported(_)) => {
                            ColorSpace::Indexed {
                                base: Box::new(base),
                                lookup,
                            }
                        }
                        _ => ColorSpace::Unsupported("Indexed".into()),
                    }
                }
                b"CalRGB" => ColorSpace::Rgb,
                b"CalGray" => ColorSpace::Gray,
                other => color_space_by_name(other),
            }
        }
        _ => ColorSpace::Unsupported("unexpected object".into()),
    }
}

fn color_space_by_name(name: &[u8]) -> ColorSpace {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => ColorSpace::Gray,
        b"DeviceRGB" | b"RGB" | b"CalRGB" => ColorSpace::Rgb,
        b"DeviceCMYK" | b"CMYK" => ColorSpace::Cmyk,
        other => ColorSpace::Unsupported(String::from_utf8_lossy(other).into_owned()),
    }
}

/// Convert raw PDF samples into an 8-bit image.
fn raw_to_image(
    data: &[u8],
    width: u32,
    height: u32,
    bits: u32,
    color_space: &ColorSpace,
    invert: bool,
) -> Result<DynamicImage, String> {
    let components = color_space
        .components()
        .ok_or_else(|| format!("unsupported color space {:?}", color_space))?;
    if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
        return Err(format!("unsupported BitsPerComponent {}", bits));
    }

    let row_bytes = (width as usize * components as usize * bits as usize).div_ceil(8);
    let needed = row_bytes * height as usize;
    if data.len() < needed {
        return Err(format!(
            "truncated sample data ({} < {} bytes)",
            data.len(),
            needed
        ));
    }

    let indexed = matches!(color_space, ColorSpace::Indexed { .. });
    let max = (1u32 << bits.min(8)) - 1;
    let samples_per_row = (width * components) as usize;
    let mut samples = Vec::with_capacity(samples_per_row * height as usize);
    for row in data[..needed].chunks_exact(row_bytes) {
        for i in 0..samples_per_row {
            let raw = read_sample(row, i, bits);
            let value = if indexed {
                raw
            } else if bits == 16 || bits == 8 {
                raw as u8
            } else {
                (u32::from(raw) * 255 / max) as u8
            };
            samples.push(if invert && !indexed { 255 - value } else { value });
        }
    }

    let pixels = width as usize * height as usize;
    let (gray, rgb) = match color_space {
        ColorSpace::Gray => (Some(samples), None),
        ColorSpace::Rgb => (None, Some(samples)),
        ColorSpace::Cmyk => (None, Some(cmyk_to_rgb(&samples))),
        ColorSpace::Indexed { base, lookup } => {
            let base_n = base.components().unwrap_or(3) as usize;
            let mut expanded = Vec::with_capacity(pixels * base_n);
            for &idx in &samples {
                let start = idx as usize * base_n;
                match lookup.get(start..start + base_n) {
                    Some(entry) => expanded.extend_from_slice(entry),
                    None => expanded.extend(std::iter::repeat(0).take(base_n)),
                }
            }
            match base.as_ref() {
                ColorSpace::Gray => (Some(expanded), None),
                ColorSpace::Cmyk => (None, Some(cmyk_to_rgb(&expanded))),
                _ => (None, Some(expanded)),
            }
        }
        ColorSpace::Unsupported(name) => return Err(format!("unsupported color space {}", name)),
    };

    if let Some(gray) = gray {
        return GrayImage::from_raw(width, height, gray)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(|| "gray buffer size mismatch".to_string());
    }
    RgbImage::from_raw(width, height, rgb.unwrap_or_default())
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| "rgb buffer size mismatch".to_string())
}

/// Read sample `i` of a packed row; 16-bit samples keep their high byte.
fn read_sample(row: &[u8], i: usize, bits: u32) -> u8 {
    match bits {
        8 => row[i],
        16 => row[i * 2],
        _ => {
            let bit = i * bits as usize;
            let byte = row[bit / 8];
            let shift = 8 - bits as usize - (bit % 8);
            (byte >> shift) & ((1u8 << bits) - 1)
        }
    }
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(cmyk.len() / 4 * 3);
    for px in cmyk.chunks_exact(4) {
        let k = 255 - u32::from(px[3]);
        for &c in &px[..3] {
            rgb.push(((255 - u32::from(c)) * k / 255) as u8);
        }
    }
    rgb
}

/// `/Decode [1 0]` on a single-component image flips its samples.
fn decode_inverted(dict: &Dictionary) -> bool {
    match dict.get(b"Decode") {
        Ok(Object::Array(values)) if values.len() == 2 => {
            let num = |o: &Object| match o {
                Object::Integer(i) => Some(*i as f32),
                Object::Real(r) => Some(*r),
                _ => None,
            };
            matches!((num(&values[0]), num(&values[1])), (Some(a), Some(b)) if a > b)
        }
        _ => false,
    }
}

fn is_image_mask(dict: &Dictionary) -> bool {
    matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)))
}

fn subtype(dict: &Dictionary) -> Option<&[u8]> {
    dict.get(b"Subtype").ok().and_then(|s| s.as_name().ok())
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    dict.get(key)
        .ok()
        .and_then(|o| o.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
}

fn filter_names(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|o| o.as_name().ok().map(|n| n.to_vec()))
            .collect(),
        _ => vec![],
    }
}

fn as_dictionary(doc: &Document, obj: &Object) -> Option<Dictionary> {
    match doc.dereference(obj) {
        Ok((_, Object::Dictionary(dict))) => Some(dict.clone()),
        _ => None,
    }
}

/// A page attribute, inherited from ancestors in the page tree when absent.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    let mut depth = 0;
    loop {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = match node.get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
        depth += 1;
        if depth > 64 {
            return None;
        }
        node = doc.get_dictionary(parent).ok()?;
    }
}

fn page_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    inherited_attribute(doc, page_id, b"Resources").and_then(|r| as_dictionary(doc, &r))
}

/// Normalized `[x0, y0, x1, y1]` of the page's MediaBox.
fn page_media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    let values: Option<Vec<f64>> = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| match doc.dereference(&obj) {
            Ok((_, Object::Array(items))) => Some(items.clone()),
            _ => None,
        })
        .and_then(|items| {
            items
                .iter()
                .map(|o| o.as_float().ok().map(f64::from))
                .collect()
        });
    match values.as_deref() {
        Some(&[x0, y0, x1, y1]) if x0 != x1 && y0 != y1 => {
            [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)]
        }
        _ => DEFAULT_MEDIA_BOX,
    }
}

/// `/XObject` entries of a resource dictionary, in dictionary order.
fn xobject_refs(doc: &Document, resources: Option<&Dictionary>) -> Vec<(Vec<u8>, ObjectId)> {
    let Some(xobjects) = resources
        .and_then(|r| r.get(b"XObject").ok())
        .and_then(|x| as_dictionary(doc, x))
    else {
        return vec![];
    };
    xobjects
        .iter()
        .filter_map(|(name, obj)| match obj {
            Object::Reference(id) => Some((name.clone(), *id)),
            _ => None,
        })
        .collect()
}
