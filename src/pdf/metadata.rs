//! PDF metadata extraction

use std::path::Path;

use lopdf::{Dictionary, Document, Object};

use super::document::{owned_dictionary, resolve, PdfDocument};
use crate::error::{Error, Result};

/// Document information dictionary entries, in display order
///
/// Every key is always present; entries missing from the file are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    /// Raw PDF date string, e.g. `D:20240315093000+01'00'`
    pub creation_date: Option<String>,
}

impl Metadata {
    /// Key/value pairs in fixed order
    pub fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("creator", self.creator.as_deref()),
            ("producer", self.producer.as_deref()),
            ("subject", self.subject.as_deref()),
            ("author", self.author.as_deref()),
            ("title", self.title.as_deref()),
            ("creation_date", self.creation_date.as_deref()),
        ]
    }

    /// Read the `/Info` dictionary of a loaded document
    pub fn from_document(doc: &Document) -> Self {
        let Some(info) = info_dictionary(doc) else {
            return Self::default();
        };

        let text = |key: &[u8]| {
            info.get(key)
                .ok()
                .and_then(|value| decode_text_string(resolve(doc, value)))
        };

        Self {
            creator: text(b"Creator"),
            producer: text(b"Producer"),
            subject: text(b"Subject"),
            author: text(b"Author"),
            title: text(b"Title"),
            creation_date: text(b"CreationDate"),
        }
    }
}

/// Summary used by the `info` command
#[derive(Debug, Clone)]
pub struct PdfInfo {
    /// Number of pages in the PDF
    pub page_count: usize,
    pub metadata: Metadata,
}

fn info_dictionary(doc: &Document) -> Option<Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    owned_dictionary(doc, info)
}

/// Decode a PDF text string
///
/// Text strings are UTF-16BE when they start with a byte order mark, and
/// PDFDocEncoding otherwise, which agrees with Latin-1 for printable text.
fn decode_text_string(object: &Object) -> Option<String> {
    let Object::String(bytes, _) = object else {
        return None;
    };

    if let Some(utf16) = bytes.strip_prefix(&[0xFE_u8, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&units));
    }

    if let Ok(utf8) = std::str::from_utf8(bytes) {
        return Some(utf8.to_string());
    }

    Some(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<Metadata> {
    let pdf = PdfDocument::open(path)?;
    Ok(Metadata::from_document(pdf.inner()))
}

/// Extract the page count and metadata from a PDF file
pub fn extract_info(path: &Path) -> Result<PdfInfo> {
    let pdf = PdfDocument::open(path)?;

    let page_count = pdf.page_count();
    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(PdfInfo {
        page_count,
        metadata: Metadata::from_document(pdf.inner()),
    })
}
