//! Assembly of a single-page PDF document.

use super::fonts::PdfFont;
use crate::error::RenderResult;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

/// Uncompressed image XObject with a separate alpha mask.
#[derive(Debug, Clone)]
pub(crate) struct PdfImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub alpha: Vec<u8>,
}

/// Everything a finished page consists of.
pub(crate) struct PageContent<'a> {
    pub width: f64,
    pub height: f64,
    pub operations: Vec<Operation>,
    /// Fill and stroke alpha per `/GS<n>` resource.
    pub alpha_states: &'a [(u8, u8)],
    pub images: &'a [PdfImage],
}

/// Numeric operand rounded to a thousandth of a point, without negative zero.
pub(crate) fn real(v: f64) -> Object {
    Object::Real(((v * 1000.0).round() / 1000.0 + 0.0) as f32)
}

pub(crate) fn name(value: impl Into<String>) -> Object {
    Object::Name(value.into().into_bytes())
}

/// Build catalog, page tree, page, content stream and resources.
pub(crate) fn write_document(page: PageContent<'_>) -> RenderResult<Vec<u8>> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in PdfFont::ALL {
        let id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), id);
    }

    let mut states = Dictionary::new();
    for (i, (fill, stroke)) in page.alpha_states.iter().enumerate() {
        let id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => real(f64::from(*fill) / 255.0),
            "CA" => real(f64::from(*stroke) / 255.0),
        });
        states.set(format!("GS{i}"), id);
    }

    let mut images = Dictionary::new();
    for (i, image) in page.images.iter().enumerate() {
        let mask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8_i64,
            },
            image.alpha.clone(),
        ));
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
                "SMask" => mask_id,
            },
            image.rgb.clone(),
        ));
        images.set(format!("Im{i}"), image_id);
    }

    let content = Content { operations: page.operations };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), real(page.width), real(page.height)],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => fonts,
            "ExtGState" => states,
            "XObject" => images,
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
