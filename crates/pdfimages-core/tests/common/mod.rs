//! Helpers that build small PDFs with lopdf for the integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Blocky pseudo-random picture; different seeds give unrelated images.
pub fn noise(width: u32, height: u32, seed: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let mut h = (x / 8).wrapping_mul(0x9E37_79B1) ^ (y / 8).wrapping_mul(0x85EB_CA77) ^ seed.wrapping_mul(0xC2B2_AE3D);
        h ^= h >> 15;
        h = h.wrapping_mul(0x2C1B_3C6D);
        h ^= h >> 12;
        Rgb([h as u8, (h >> 8) as u8, (h >> 16) as u8])
    })
}

/// Image placed on a page.
pub enum Picture {
    /// Raw 8-bit RGB samples
    Raw(RgbImage),
    /// JPEG bytes stored as a DCTDecode stream
    Jpeg(Vec<u8>, u32, u32),
}

impl Picture {
    pub fn jpeg(image: &RgbImage) -> Self {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .unwrap();
        Picture::Jpeg(buffer.into_inner(), image.width(), image.height())
    }
}

/// One page: pictures drawn directly plus pictures wrapped in a Form XObject.
///
/// Direct pictures are named `Im0`, `Im1`, ... and the form `Fm0`. Unless
/// `content` overrides it, each is drawn once as a 100x100pt box.
#[derive(Default)]
pub struct PageSpec {
    pub direct: Vec<Picture>,
    pub in_form: Vec<Picture>,
    /// Page content stream replacing the generated one
    pub content: Option<String>,
    /// Adds a 1-bit stencil mask named `M0` to the page resources
    pub stencil: bool,
}

impl PageSpec {
    pub fn with(direct: Vec<Picture>) -> Self {
        Self {
            direct,
            ..Self::default()
        }
    }

    /// A single picture painted over the whole 612x792pt page.
    pub fn full_page(picture: Picture) -> Self {
        Self {
            direct: vec![picture],
            content: Some("q 612 0 0 792 0 0 cm /Im0 Do Q".into()),
            ..Self::default()
        }
    }
}

fn stencil_object(doc: &mut Document) -> ObjectId {
    let mut stream = Stream::new(
        dictionary! {
            "Type" => Object::Name(b"XObject".to_vec()),
            "Subtype" => Object::Name(b"Image".to_vec()),
            "Width" => Object::Integer(32),
            "Height" => Object::Integer(32),
            "ImageMask" => Object::Boolean(true),
            "BitsPerComponent" => Object::Integer(1),
        },
        vec![0xAA; 4 * 32],
    );
    stream.allows_compression = false;
    doc.add_object(Object::Stream(stream))
}

fn image_object(doc: &mut Document, picture: &Picture) -> ObjectId {
    let stream = match picture {
        Picture::Raw(img) => Stream::new(
            dictionary! {
                "Type" => Object::Name(b"XObject".to_vec()),
                "Subtype" => Object::Name(b"Image".to_vec()),
                "Width" => Object::Integer(i64::from(img.width())),
                "Height" => Object::Integer(i64::from(img.height())),
                "ColorSpace" => Object::Name(b"DeviceRGB".to_vec()),
                "BitsPerComponent" => Object::Integer(8),
            },
            img.as_raw().clone(),
        ),
        Picture::Jpeg(bytes, w, h) => Stream::new(
            dictionary! {
                "Type" => Object::Name(b"XObject".to_vec()),
                "Subtype" => Object::Name(b"Image".to_vec()),
                "Width" => Object::Integer(i64::from(*w)),
                "Height" => Object::Integer(i64::from(*h)),
                "ColorSpace" => Object::Name(b"DeviceRGB".to_vec()),
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => Object::Name(b"DCTDecode".to_vec()),
            },
            bytes.clone(),
        ),
    };
    let mut stream = stream;
    stream.allows_compression = false;
    doc.add_object(Object::Stream(stream))
}

fn draw_ops(names: &[String]) -> Vec<u8> {
    let mut ops = String::new();
    for (i, name) in names.iter().enumerate() {
        ops.push_str(&format!("q 100 0 0 100 {} 0 cm /{} Do Q\n", i * 110, name));
    }
    ops.into_bytes()
}

/// Build a PDF with the given pages and save it to `path`.
pub fn write_pdf(path: &Path, pages: &[PageSpec]) {
    save(build_document(pages), path);
}

/// Like [`write_pdf`], but RC4-encrypted with an empty user password.
pub fn write_encrypted_pdf(path: &Path, pages: &[PageSpec]) {
    let mut doc = build_document(pages);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => Object::Name(b"Standard".to_vec()),
        "V" => Object::Integer(4),
        "R" => Object::Integer(4),
        "Length" => Object::Integer(128),
        "CF" => dictionary! {
            "StdCF" => dictionary! {
                "CFM" => Object::Name(b"V2".to_vec()),
                "Length" => Object::Integer(16),
            },
        },
        "StmF" => Object::Name(b"StdCF".to_vec()),
        "StrF" => Object::Name(b"StdCF".to_vec()),
        "O" => Object::String(vec![0x5A; 32], StringFormat::Hexadecimal),
        "P" => Object::Integer(-4),
    });
    let file_id = Object::String(vec![0x17; 16], StringFormat::Hexadecimal);
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    doc.trailer.set("ID", Object::Array(vec![file_id.clone(), file_id]));

    let key = lopdf::encryption::get_encryption_key(&doc, "", false).unwrap();
    let ids: Vec<ObjectId> = doc.objects.keys().copied().filter(|id| *id != encrypt_id).collect();
    for id in ids {
        // RC4 is symmetric, so the decryption routine also encrypts.
        let cipher = match lopdf::encryption::decrypt_object(&key, id, &doc.objects[&id], false) {
            Ok(bytes) => bytes,
            Err(_) => continue,
        };
        if let Some(Object::Stream(stream)) = doc.objects.get_mut(&id) {
            stream.set_content(cipher);
        }
    }
    save(doc, path);
}

fn save(mut doc: Document, path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).unwrap();
}

fn build_document(pages: &[PageSpec]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for page in pages {
        let mut xobjects = lopdf::Dictionary::new();
        let mut names = Vec::new();
        for (i, picture) in page.direct.iter().enumerate() {
            let name = format!("Im{}", i);
            let id = image_object(&mut doc, picture);
            xobjects.set(name.as_bytes().to_vec(), Object::Reference(id));
            names.push(name);
        }

        if !page.in_form.is_empty() {
            let mut form_xobjects = lopdf::Dictionary::new();
            let mut form_names = Vec::new();
            for (i, picture) in page.in_form.iter().enumerate() {
                let name = format!("FIm{}", i);
                let id = image_object(&mut doc, picture);
                form_xobjects.set(name.as_bytes().to_vec(), Object::Reference(id));
                form_names.push(name);
            }
            let form = Stream::new(
                dictionary! {
                    "Type" => Object::Name(b"XObject".to_vec()),
                    "Subtype" => Object::Name(b"Form".to_vec()),
                    "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                    "Resources" => dictionary! { "XObject" => Object::Dictionary(form_xobjects) },
                },
                draw_ops(&form_names),
            );
            let form_id = doc.add_object(Object::Stream(form));
            xobjects.set(b"Fm0".to_vec(), Object::Reference(form_id));
            names.push("Fm0".to_string());
        }

        if page.stencil {
            let id = stencil_object(&mut doc);
            xobjects.set(b"M0".to_vec(), Object::Reference(id));
        }

        let content = match &page.content {
            Some(ops) => ops.clone().into_bytes(),
            None => draw_ops(&names),
        };
        let content_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, content)));
        let page_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Page".to_vec()),
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! { "XObject" => Object::Dictionary(xobjects) },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Catalog".to_vec()),
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

/// A config writing into `out` with size filters relaxed for small test images.
pub fn test_config(out: &Path) -> pdfimages_core::Config {
    let mut config = pdfimages_core::Config::default();
    config.output.directory = out.to_path_buf();
    config.processing.min_width = 16;
    config.processing.min_height = 16;
    config.filters.min_size_bytes = 0;
    config.processing.parallel_workers = 2;
    config
}
