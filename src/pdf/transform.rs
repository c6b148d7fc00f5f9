//! Page rotation and the fixed crop demonstration

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, StringFormat};
use tracing::{info, instrument};

use super::document::{save_document, PdfDocument};
use super::merge::{file_stem, PageAssembler};
use crate::error::{Error, Result};

/// Script that opens the viewer's print dialog
pub const PRINT_DIALOG_SCRIPT: &str = "this.print({bUI:true,bSilent:false,bShrinkToFit:true});";

/// Rotate every page of a PDF clockwise by `angle` degrees
///
/// The angle is added to each page's existing rotation and must be a
/// multiple of 90.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display(), angle = angle))]
pub fn rotate_pdf(input: &Path, output: &Path, angle: i64) -> Result<()> {
    if angle % 90 != 0 {
        return Err(Error::InvalidRotation(angle));
    }

    let mut pdf = PdfDocument::open(input)?;
    for page_number in pdf.page_numbers() {
        pdf.rotate_page(page_number, angle)?;
    }
    pdf.save(output)?;

    info!("Rotated {} pages by {} degrees", pdf.page_count(), angle);
    Ok(())
}

/// Fixed crop and rotate example over the first three pages
///
/// Page 1 is copied unchanged, page 2 is rotated 90° clockwise and page 3
/// has the upper-right corner of its media box halved. Later pages are
/// dropped. The result opens the print dialog when viewed and is written to
/// `{output_dir}/{stem}_cropped.pdf`.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn crop_and_transform_sample(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    const REQUIRED_PAGES: usize = 3;

    let mut pdf = PdfDocument::open(input)?;
    let page_count = pdf.page_count();
    if page_count < REQUIRED_PAGES {
        return Err(Error::NotEnoughPages {
            path: input.to_path_buf(),
            required: REQUIRED_PAGES,
            found: page_count,
        });
    }

    let pages = pdf.page_numbers();
    let (second, third) = (pages[1], pages[2]);

    pdf.rotate_page(second, 90)?;
    let cropped = pdf.media_box(third)?.with_halved_upper_right();
    pdf.set_media_box(third, cropped)?;

    let first_three = &pages[..REQUIRED_PAGES];
    let mut assembler = PageAssembler::new();
    assembler.append(pdf, |n| first_three.contains(&n))?;
    let mut doc = assembler.finish();

    add_document_script(&mut doc, PRINT_DIALOG_SCRIPT)?;

    let output = output_dir.join(format!("{}_cropped.pdf", file_stem(input)));
    save_document(&mut doc, &output)?;

    info!("Cropped sample saved as {}", output.display());
    Ok(output)
}

/// Attach a document-level JavaScript action
///
/// The script is registered in the catalog's `/Names /JavaScript` tree and
/// set as the `/OpenAction`, so viewers run it when the document opens.
pub fn add_document_script(doc: &mut Document, script: &str) -> Result<()> {
    let mut action = Dictionary::new();
    action.set("Type", Object::Name(b"Action".to_vec()));
    action.set("S", Object::Name(b"JavaScript".to_vec()));
    action.set(
        "JS",
        Object::String(script.as_bytes().to_vec(), StringFormat::Literal),
    );
    let action_id = doc.add_object(action);

    let mut javascript = Dictionary::new();
    javascript.set(
        "Names",
        Object::Array(vec![
            Object::String(b"print-dialog".to_vec(), StringFormat::Literal),
            Object::Reference(action_id),
        ]),
    );
    let mut names = Dictionary::new();
    names.set("JavaScript", Object::Dictionary(javascript));

    let catalog = doc.catalog_mut()?;
    catalog.set("Names", Object::Dictionary(names));
    catalog.set("OpenAction", Object::Reference(action_id));

    Ok(())
}
