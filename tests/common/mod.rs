//! PDF fixtures built with lopdf

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Bytes standing in for an encoded JPEG; extraction copies them verbatim
pub const IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fixture-image\xFF\xD9";

/// What to put in a synthesized PDF
#[derive(Default)]
pub struct Fixture<'a> {
    pub pages: u32,
    pub info: &'a [(&'a str, &'a str)],
    /// Pages that reference one image XObject named `Im0`
    pub image_pages: &'a [u32],
    /// Page whose only image `Im0` is wrapped in the Form XObject `Fm0`
    pub form_image_page: Option<u32>,
}

impl Fixture<'_> {
    pub fn pages(pages: u32) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    /// Write the document to `dir/name` and return its path
    ///
    /// Each page shows `Page n` in Helvetica. Resources and the Letter media
    /// box live on the root `/Pages` node and are inherited by the pages.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        let resources_id = doc.add_object(Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
        )]));

        let mut kids = Vec::new();
        for page_number in 1..=self.pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Page {page_number}").into_bytes(),
                            StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                content.encode().expect("encode page content"),
            ));

            let mut page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
            ]);
            if self.image_pages.contains(&page_number) {
                page.set("Resources", image_resources(&mut doc, font_id));
            }
            if self.form_image_page == Some(page_number) {
                page.set("Resources", form_resources(&mut doc, font_id));
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Count", Object::Integer(i64::from(self.pages))),
                ("Kids", Object::Array(kids)),
                ("Resources", Object::Reference(resources_id)),
                (
                    "MediaBox",
                    Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
                ),
            ])),
        );

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if !self.info.is_empty() {
            let info = Dictionary::from_iter(self.info.iter().map(|(key, value)| {
                (
                    key.to_string(),
                    Object::String(value.as_bytes().to_vec(), StringFormat::Literal),
                )
            }));
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", Object::Reference(info_id));
        }

        let path = dir.join(name);
        doc.save(&path).expect("save fixture");
        path
    }
}

fn image_stream() -> Stream {
    Stream::new(
        Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(1)),
            ("Height", Object::Integer(1)),
            ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"DCTDecode".to_vec())),
        ]),
        IMAGE_BYTES.to_vec(),
    )
}

fn font_entry(font_id: ObjectId) -> (&'static str, Object) {
    (
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )
}

/// Page-level resources with the shared font and one JPEG image
fn image_resources(doc: &mut Document, font_id: ObjectId) -> Object {
    let image_id = doc.add_object(image_stream());

    Object::Dictionary(Dictionary::from_iter(vec![
        font_entry(font_id),
        (
            "XObject",
            Object::Dictionary(Dictionary::from_iter(vec![("Im0", Object::Reference(image_id))])),
        ),
    ]))
}

/// Page-level resources whose image is only reachable through a form
fn form_resources(doc: &mut Document, font_id: ObjectId) -> Object {
    let image_id = doc.add_object(image_stream());
    let form = Stream::new(
        Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Form".to_vec())),
            (
                "BBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
            (
                "Resources",
                Object::Dictionary(Dictionary::from_iter(vec![(
                    "XObject",
                    Object::Dictionary(Dictionary::from_iter(vec![(
                        "Im0",
                        Object::Reference(image_id),
                    )])),
                )])),
            ),
        ]),
        b"q 100 0 0 100 72 72 cm /Im0 Do Q".to_vec(),
    );
    let form_id = doc.add_object(form);

    Object::Dictionary(Dictionary::from_iter(vec![
        font_entry(font_id),
        (
            "XObject",
            Object::Dictionary(Dictionary::from_iter(vec![("Fm0", Object::Reference(form_id))])),
        ),
    ]))
}
