//! Scoped document handle over lopdf
//!
//! Every operation opens its own [`PdfDocument`], works on it, and drops it
//! before returning. Nothing holds a document across operations.

use std::fs;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Attributes a page may inherit from its ancestor `/Pages` nodes
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `/Parent` chains and self-nesting forms in malformed files
const MAX_TREE_DEPTH: usize = 32;

/// Text of one page, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// An image XObject found in a page's resources
#[derive(Debug, Clone)]
pub struct ImageResource {
    /// Resource name from the `/XObject` dictionary (e.g. `Im0`), prefixed
    /// with the enclosing form's name for nested images (`Fm0_Im0`)
    pub name: String,
    /// Raw stream bytes, still encoded with the stream's filter
    pub data: Vec<u8>,
    /// File extension matching the stream filter
    pub extension: &'static str,
}

/// An open PDF document
#[derive(Clone)]
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    /// Open a PDF from the filesystem
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let doc = Document::load(path).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(pages = doc.get_pages().len(), "PDF loaded");

        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// 1-based page numbers in document order
    pub fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    pub fn inner(&self) -> &Document {
        &self.doc
    }

    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_inner(self) -> Document {
        self.doc
    }

    /// Object ID of a 1-based page number
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.doc.get_pages();
        pages
            .get(&page_number)
            .copied()
            .ok_or(Error::PageOutOfRange {
                page: page_number,
                total: pages.len(),
            })
    }

    /// Extract the plain text of one page
    pub fn page_text(&self, page_number: u32) -> Result<String> {
        self.page_id(page_number)?;
        Ok(self.doc.extract_text(&[page_number])?)
    }

    /// Extract the text of every page in order
    ///
    /// A page whose text cannot be decoded yields an empty string.
    pub fn pages_text(&self) -> Vec<PageText> {
        self.page_numbers()
            .into_iter()
            .map(|page_number| {
                let text = self.page_text(page_number).unwrap_or_else(|e| {
                    warn!(page_number, error = %e, "Text extraction failed");
                    String::new()
                });
                PageText { page_number, text }
            })
            .collect()
    }

    /// Current clockwise rotation of a page, honouring inherited `/Rotate`
    pub fn rotation(&self, page_number: u32) -> Result<i64> {
        let page_id = self.page_id(page_number)?;
        let rotation = inherited_attribute(&self.doc, page_id, b"Rotate")
            .and_then(|obj| resolve(&self.doc, &obj).as_i64().ok())
            .unwrap_or(0);
        Ok(rotation)
    }

    /// Rotate a page clockwise by `degrees` (a multiple of 90)
    ///
    /// Returns the new normalized rotation.
    pub fn rotate_page(&mut self, page_number: u32, degrees: i64) -> Result<i64> {
        if degrees % 90 != 0 {
            return Err(Error::InvalidRotation(degrees));
        }

        let existing = self.rotation(page_number)?;
        // Reduce first so huge quarter-turn multiples cannot overflow
        let rotation = (existing.rem_euclid(360) + degrees.rem_euclid(360)).rem_euclid(360);

        let page_id = self.page_id(page_number)?;
        self.doc
            .get_dictionary_mut(page_id)?
            .set("Rotate", Object::Integer(rotation));

        debug!(page_number, existing, rotation, "Page rotated");
        Ok(rotation)
    }

    /// Effective media box of a page, defaulting to US Letter
    pub fn media_box(&self, page_number: u32) -> Result<PageBox> {
        let page_id = self.page_id(page_number)?;
        let media_box = inherited_attribute(&self.doc, page_id, b"MediaBox")
            .and_then(|obj| PageBox::from_object(resolve(&self.doc, &obj)))
            .unwrap_or_else(PageBox::letter);
        Ok(media_box)
    }

    /// Replace the media box of a page
    pub fn set_media_box(&mut self, page_number: u32, media_box: PageBox) -> Result<()> {
        let page_id = self.page_id(page_number)?;
        self.doc
            .get_dictionary_mut(page_id)?
            .set("MediaBox", media_box.to_object());
        Ok(())
    }

    /// Image XObjects drawn by a page, in resource order
    ///
    /// Images nested inside Form XObjects are included, named after the
    /// form that holds them (`Fm0_Im0`).
    pub fn images(&self, page_number: u32) -> Result<Vec<ImageResource>> {
        let page_id = self.page_id(page_number)?;

        let mut images = Vec::new();
        if let Some(resources) = inherited_attribute(&self.doc, page_id, b"Resources") {
            collect_images(&self.doc, &resources, "", 0, &mut images);
        }
        Ok(images)
    }

    /// Copy inherited page attributes onto every page dictionary
    ///
    /// Needed before a page is moved under a new `/Pages` node, otherwise it
    /// loses the fonts and geometry stored on its old ancestors.
    pub fn materialize_inherited(&mut self) -> Result<()> {
        let page_ids: Vec<ObjectId> = self.doc.get_pages().into_values().collect();

        for page_id in page_ids {
            let mut inherited = Vec::new();
            {
                let page = self.doc.get_dictionary(page_id)?;
                for key in INHERITABLE_KEYS {
                    if page.has(key) {
                        continue;
                    }
                    if let Some(value) = inherited_attribute(&self.doc, page_id, key) {
                        inherited.push((key, value));
                    }
                }
            }

            let page = self.doc.get_dictionary_mut(page_id)?;
            for (key, value) in inherited {
                page.set(key, value);
            }
        }

        Ok(())
    }

    /// Save to `output`, creating parent directories if needed
    pub fn save(&mut self, output: &Path) -> Result<()> {
        save_document(&mut self.doc, output)
    }
}

/// Save a document to `output`, creating parent directories if needed
pub(crate) fn save_document(doc: &mut Document, output: &Path) -> Result<()> {
    ensure_parent_dir(output)?;
    doc.save(output)?;
    debug!(output = %output.display(), "PDF saved");
    Ok(())
}

/// Create the parent directory of `path` if it does not exist
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Follow a single indirect reference, returning the object itself otherwise
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Resolve an object to an owned dictionary, if it is (or points to) one
pub(crate) fn owned_dictionary(doc: &Document, object: &Object) -> Option<Dictionary> {
    match resolve(doc, object) {
        Object::Dictionary(dict) => Some(dict.clone()),
        _ => None,
    }
}

/// Look up `key` on a page, walking up the `/Parent` chain
///
/// The value is returned as stored (references are not followed), so it can
/// be copied onto the page without duplicating shared objects.
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        match current.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current = doc.get_dictionary(*parent_id).ok()?,
            _ => return None,
        }
    }

    None
}

/// Gather the image XObjects of a resources dictionary, descending into forms
fn collect_images(
    doc: &Document,
    resources: &Object,
    prefix: &str,
    depth: usize,
    images: &mut Vec<ImageResource>,
) {
    if depth >= MAX_TREE_DEPTH {
        warn!(prefix, "Form XObjects nested too deeply, skipping");
        return;
    }
    let Object::Dictionary(resources) = resolve(doc, resources) else {
        return;
    };
    let Some(Object::Dictionary(xobjects)) = resources.get(b"XObject").ok().map(|obj| resolve(doc, obj))
    else {
        return;
    };

    for (name, reference) in xobjects.iter() {
        let Object::Stream(stream) = resolve(doc, reference) else {
            continue;
        };
        let name = format!("{}{}", prefix, String::from_utf8_lossy(name));

        match stream.dict.get(b"Subtype") {
            Ok(Object::Name(subtype)) if subtype == b"Image" => images.push(ImageResource {
                name,
                data: stream.content.clone(),
                extension: image_extension(&stream.dict),
            }),
            Ok(Object::Name(subtype)) if subtype == b"Form" => {
                if let Ok(form_resources) = stream.dict.get(b"Resources") {
                    collect_images(doc, form_resources, &format!("{name}_"), depth + 1, images);
                }
            }
            _ => {}
        }
    }
}

/// File extension for an image stream, based on its last filter
fn image_extension(dict: &Dictionary) -> &'static str {
    let filter = match dict.get(b"Filter") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        Ok(Object::Array(filters)) => filters.iter().rev().find_map(|f| match f {
            Object::Name(name) => Some(name.as_slice()),
            _ => None,
        }),
        _ => None,
    };

    match filter {
        Some(b"DCTDecode") => "jpg",
        Some(b"JPXDecode") => "jp2",
        Some(b"JBIG2Decode") => "jb2",
        Some(b"CCITTFaxDecode") => "ccitt",
        _ => "raw",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    fn dict_with_filter(filter: Object) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Filter", filter);
        dict
    }

    #[test]
    fn test_open_nonexistent_file() {
        let result = PdfDocument::open(Path::new("nonexistent.pdf"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_image_extension_single_filter() {
        let dict = dict_with_filter(Object::Name(b"DCTDecode".to_vec()));
        assert_eq!(image_extension(&dict), "jpg");
    }

    #[test]
    fn test_image_extension_filter_chain_uses_last() {
        let dict = dict_with_filter(Object::Array(vec![
            Object::Name(b"FlateDecode".to_vec()),
            Object::Name(b"JPXDecode".to_vec()),
        ]));
        assert_eq!(image_extension(&dict), "jp2");
    }

    #[test]
    fn test_image_extension_unfiltered() {
        assert_eq!(image_extension(&Dictionary::new()), "raw");
        let flate = dict_with_filter(Object::Name(b"FlateDecode".to_vec()));
        assert_eq!(image_extension(&flate), "raw");
    }

    fn image_stream() -> Stream {
        Stream::new(
            Dictionary::from_iter(vec![
                ("Type", Object::Name(b"XObject".to_vec())),
                ("Subtype", Object::Name(b"Image".to_vec())),
                ("Filter", Object::Name(b"DCTDecode".to_vec())),
            ]),
            vec![0xFF, 0xD8, 0xFF, 0xD9],
        )
    }

    fn xobject_resources(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(Dictionary::from_iter(vec![(
            "XObject",
            Object::Dictionary(Dictionary::from_iter(entries)),
        )]))
    }

    #[test]
    fn test_collect_images_inside_form() {
        let mut doc = Document::with_version("1.5");
        let image_id = doc.add_object(image_stream());
        let form_id = doc.add_object(Stream::new(
            Dictionary::from_iter(vec![
                ("Type", Object::Name(b"XObject".to_vec())),
                ("Subtype", Object::Name(b"Form".to_vec())),
                (
                    "Resources",
                    xobject_resources(vec![("Im0", Object::Reference(image_id))]),
                ),
            ]),
            b"/Im0 Do".to_vec(),
        ));
        let resources = xobject_resources(vec![("Fm0", Object::Reference(form_id))]);

        let mut images = Vec::new();
        collect_images(&doc, &resources, "", 0, &mut images);

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "Fm0_Im0");
        assert_eq!(images[0].extension, "jpg");
        assert_eq!(images[0].data, vec![0xFF, 0xD8, 0xFF, 0xD9]);
    }

    #[test]
    fn test_collect_images_self_nesting_form_terminates() {
        let mut doc = Document::with_version("1.5");
        let form_id = doc.new_object_id();
        let resources = xobject_resources(vec![("Fm0", Object::Reference(form_id))]);
        doc.objects.insert(
            form_id,
            Object::Stream(Stream::new(
                Dictionary::from_iter(vec![
                    ("Subtype", Object::Name(b"Form".to_vec())),
                    ("Resources", resources.clone()),
                ]),
                Vec::new(),
            )),
        );

        let mut images = Vec::new();
        collect_images(&doc, &resources, "", 0, &mut images);
        assert!(images.is_empty());
    }

    #[test]
    fn test_inherited_attribute_walks_parents() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
                ("Count", Object::Integer(1)),
                ("Rotate", Object::Integer(180)),
            ])),
        );

        assert_eq!(
            inherited_attribute(&doc, page_id, b"Rotate"),
            Some(Object::Integer(180))
        );
        assert_eq!(inherited_attribute(&doc, page_id, b"MediaBox"), None);
    }
}
