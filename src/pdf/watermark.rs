//! Text watermarks
//!
//! The watermark is a single-page overlay document built in memory. Its
//! objects are imported into the target document and its content stream is
//! drawn on top of every page. The overlay is never written to disk.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{info, instrument};

use super::document::{owned_dictionary, PdfDocument};
use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Resource names used by the overlay; chosen to stay clear of typical page fonts
const FONT_RESOURCE: &str = "WmF1";
const GSTATE_RESOURCE: &str = "WmGS1";

/// Options for the watermark overlay
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    /// Text to draw
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Counter-clockwise rotation of the text in degrees
    pub angle: f32,
    /// Fill and stroke opacity, 0.0 to 1.0
    pub opacity: f32,
    /// Fill color as RGB components, 0.0 to 1.0
    pub color: (f32, f32, f32),
    /// Overlay page size
    pub page: PageBox,
}

impl WatermarkOptions {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 50.0,
            angle: 45.0,
            opacity: 0.3,
            color: (0.5, 0.0, 0.0),
            page: PageBox::letter(),
        }
    }
}

/// Add a text watermark to every page of a PDF
///
/// # Example
///
/// ```no_run
/// use pdf_manager::pdf::{watermark_pdf, WatermarkOptions};
/// use std::path::Path;
///
/// watermark_pdf(
///     Path::new("plain.pdf"),
///     Path::new("marked.pdf"),
///     &WatermarkOptions::new("CONFIDENTIAL"),
/// ).expect("Failed to watermark");
/// ```
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn watermark_pdf(input: &Path, output: &Path, options: &WatermarkOptions) -> Result<usize> {
    let mut pdf = PdfDocument::open(input)?;
    let overlay = create_watermark_overlay(options)?;

    let pages = overlay_onto_pages(pdf.inner_mut(), &overlay)?;

    pdf.inner_mut().prune_objects();
    pdf.save(output)?;

    info!("Watermarked PDF saved as {}", output.display());
    Ok(pages)
}

/// Build the single-page overlay document
pub fn create_watermark_overlay(options: &WatermarkOptions) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = use_helvetica_font(&mut doc);

    let mut gstate = Dictionary::new();
    gstate.set("Type", Object::Name(b"ExtGState".to_vec()));
    gstate.set("ca", Object::Real(options.opacity));
    gstate.set("CA", Object::Real(options.opacity));
    let gstate_id = doc.add_object(gstate);

    let mut fonts = Dictionary::new();
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    let mut gstates = Dictionary::new();
    gstates.set(GSTATE_RESOURCE, Object::Reference(gstate_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    resources.set("ExtGState", Object::Dictionary(gstates));

    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        generate_watermark_content(options),
    ));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("MediaBox", options.page.to_object());
    page.set("Contents", Object::Reference(content_id));
    page.set("Resources", Object::Dictionary(resources));
    let page_id = doc.add_object(page);

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    Ok(doc)
}

/// Use Helvetica (one of the 14 standard PDF fonts, so nothing is embedded)
fn use_helvetica_font(doc: &mut Document) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));

    doc.add_object(Object::Dictionary(font))
}

/// Content stream drawing the rotated, centered text
fn generate_watermark_content(options: &WatermarkOptions) -> Vec<u8> {
    let (cx, cy) = options.page.center();
    let (r, g, b) = options.color;
    let theta = options.angle.to_radians();
    let (sin, cos) = theta.sin_cos();

    let text_width = helvetica_text_width(&options.text, options.font_size);
    // Approximate text height is the font size
    let x = -text_width / 2.0;
    let y = -options.font_size / 2.0;

    let mut content = Vec::new();
    content.extend_from_slice(b"q\n");
    content.extend_from_slice(format!("/{} gs\n", GSTATE_RESOURCE).as_bytes());
    content.extend_from_slice(format!("{} {} {} rg\n", r, g, b).as_bytes());
    // Move to the page center, then rotate about it
    content.extend_from_slice(format!("1 0 0 1 {} {} cm\n", cx, cy).as_bytes());
    content.extend_from_slice(format!("{} {} {} {} 0 0 cm\n", cos, sin, -sin, cos).as_bytes());
    content.extend_from_slice(b"BT\n");
    content.extend_from_slice(format!("/{} {} Tf\n", FONT_RESOURCE, options.font_size).as_bytes());
    content.extend_from_slice(format!("{} {} Td\n", x, y).as_bytes());
    content.push(b'(');
    content.extend_from_slice(&escape_pdf_string(&options.text));
    content.extend_from_slice(b") Tj\n");
    content.extend_from_slice(b"ET\n");
    content.extend_from_slice(b"Q\n");
    content
}

/// Encode text as a WinAnsi literal string body, escaping delimiters
///
/// Characters outside Latin-1 are replaced with `?`.
fn escape_pdf_string(text: &str) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.extend_from_slice(b"\\\\"),
            '(' => escaped.extend_from_slice(b"\\("),
            ')' => escaped.extend_from_slice(b"\\)"),
            '\r' => escaped.extend_from_slice(b"\\r"),
            '\n' => escaped.extend_from_slice(b"\\n"),
            c if (c as u32) < 0x100 => escaped.push(c as u8),
            _ => escaped.push(b'?'),
        }
    }
    escaped
}

/// Helvetica glyph widths for chars 32-126, in 1/1000ths of the em square
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Width of `text` set in Helvetica at `font_size`
fn helvetica_text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as u32,
            _ => 556,
        })
        .sum();
    units as f32 * font_size / 1000.0
}

/// Draw the first page of `overlay` over every page of `target`
///
/// Returns the number of pages marked.
pub fn overlay_onto_pages(target: &mut Document, overlay: &Document) -> Result<usize> {
    let (overlay_content, overlay_resources) = import_overlay(target, overlay)?;

    let page_ids: Vec<ObjectId> = target.get_pages().into_values().collect();
    for &page_id in &page_ids {
        wrap_page_content_in_graphics_state(target, page_id)?;

        let existing_resources = target
            .get_dictionary(page_id)?
            .get(b"Resources")
            .ok()
            .and_then(|res| owned_dictionary(target, res));
        let inherited_resources = match existing_resources {
            Some(resources) => Some(resources),
            None => super::document::inherited_attribute(target, page_id, b"Resources")
                .and_then(|res| owned_dictionary(target, &res)),
        };
        let resources = merge_resources(
            target,
            inherited_resources.unwrap_or_else(Dictionary::new),
            &overlay_resources,
        );

        let page = target.get_dictionary_mut(page_id)?;
        append_contents(page, overlay_content.clone());
        page.set("Resources", Object::Dictionary(resources));
    }

    Ok(page_ids.len())
}

/// Copy the overlay's objects into `target` with fresh IDs
///
/// Returns the remapped content references and resources of the overlay's
/// first page.
fn import_overlay(target: &mut Document, overlay: &Document) -> Result<(Vec<Object>, Dictionary)> {
    let id_offset = target.max_id + 1;

    let id_map: HashMap<ObjectId, ObjectId> = overlay
        .objects
        .keys()
        .map(|old_id| (*old_id, (old_id.0 + id_offset, old_id.1)))
        .collect();

    for (old_id, object) in overlay.objects.iter() {
        target
            .objects
            .insert(id_map[old_id], renumber_object_references(object, &id_map));
    }
    target.max_id = overlay.max_id + id_offset;

    let overlay_page_id = overlay
        .get_pages()
        .into_values()
        .next()
        .ok_or(Error::PageOutOfRange { page: 1, total: 0 })?;
    let page = overlay.get_dictionary(overlay_page_id)?;

    let content_refs = match page.get(b"Contents") {
        Ok(content) => match renumber_object_references(content, &id_map) {
            Object::Array(arr) => arr,
            other => vec![other],
        },
        Err(_) => vec![],
    };

    let resources = match page.get(b"Resources") {
        Ok(res) => match renumber_object_references(res, &id_map) {
            Object::Dictionary(dict) => dict,
            other => owned_dictionary(target, &other).unwrap_or_else(Dictionary::new),
        },
        Err(_) => Dictionary::new(),
    };

    Ok((content_refs, resources))
}

/// Renumber all object references in an object
fn renumber_object_references(object: &Object, id_map: &HashMap<ObjectId, ObjectId>) -> Object {
    match object {
        Object::Reference(old_id) => Object::Reference(*id_map.get(old_id).unwrap_or(old_id)),
        Object::Array(arr) => Object::Array(
            arr.iter()
                .map(|obj| renumber_object_references(obj, id_map))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(renumber_dictionary(dict, id_map)),
        Object::Stream(stream) => {
            let mut renumbered = stream.clone();
            renumbered.dict = renumber_dictionary(&stream.dict, id_map);
            Object::Stream(renumbered)
        }
        _ => object.clone(),
    }
}

fn renumber_dictionary(dict: &Dictionary, id_map: &HashMap<ObjectId, ObjectId>) -> Dictionary {
    let mut renumbered = Dictionary::new();
    for (key, value) in dict.iter() {
        renumbered.set(key.clone(), renumber_object_references(value, id_map));
    }
    renumbered
}

/// Merge overlay resources into a page's resources dictionary
///
/// Resource categories (Font, ExtGState, XObject, ...) present on both sides
/// are merged entry by entry; sub-dictionaries stored indirectly are resolved
/// first so the page's own entries survive.
fn merge_resources(doc: &Document, mut page_resources: Dictionary, overlay: &Dictionary) -> Dictionary {
    for (key, value) in overlay.iter() {
        let existing = page_resources
            .get(key)
            .ok()
            .and_then(|obj| owned_dictionary(doc, obj));

        match (existing, value) {
            (Some(mut merged), Object::Dictionary(overlay_entries)) => {
                for (name, entry) in overlay_entries.iter() {
                    merged.set(name.clone(), entry.clone());
                }
                page_resources.set(key.clone(), Object::Dictionary(merged));
            }
            _ => {
                if !page_resources.has(key) {
                    page_resources.set(key.clone(), value.clone());
                }
            }
        }
    }
    page_resources
}

/// Wrap a page's existing content streams in q/Q
///
/// Transformations and color changes left open by the page content would
/// otherwise apply to the overlay drawn after it.
fn wrap_page_content_in_graphics_state(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let existing = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
        Ok(Object::Array(arr)) => arr.clone(),
        _ => return Ok(()),
    };

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    let mut wrapped = Vec::with_capacity(existing.len() + 2);
    wrapped.push(Object::Reference(save_id));
    wrapped.extend(existing);
    wrapped.push(Object::Reference(restore_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(wrapped));
    Ok(())
}

/// Append content references to a page's Contents
fn append_contents(page: &mut Dictionary, extra: Vec<Object>) {
    let contents = match page.get(b"Contents").ok().cloned() {
        Some(Object::Array(mut arr)) => {
            arr.extend(extra);
            arr
        }
        Some(single @ Object::Reference(_)) => {
            let mut arr = vec![single];
            arr.extend(extra);
            arr
        }
        _ => extra,
    };
    page.set("Contents", Object::Array(contents));
}
