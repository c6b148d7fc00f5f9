//! Page assembly with lopdf: merging and splitting PDFs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use super::document::{save_document, PdfDocument};
use crate::error::{Error, Result};

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// Collects pages from several documents under one new page tree
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
pub struct PageAssembler {
    max_id: u32,
    page_ids: Vec<ObjectId>,
    objects: BTreeMap<ObjectId, Object>,
}

impl Default for PageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PageAssembler {
    pub fn new() -> Self {
        Self {
            max_id: 1,
            page_ids: Vec::new(),
            objects: BTreeMap::new(),
        }
    }

    /// Number of pages collected so far
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append the pages of `pdf` whose 1-based number satisfies `keep`, in order
    pub fn append(&mut self, mut pdf: PdfDocument, keep: impl Fn(u32) -> bool) -> Result<()> {
        // Pages are re-parented below, so inherited fonts and boxes must move onto them
        pdf.materialize_inherited()?;
        let mut doc = pdf.into_inner();

        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(self.max_id);
        self.max_id = doc.max_id + 1;

        self.page_ids.extend(
            doc.get_pages()
                .into_iter()
                .filter(|(page_number, _)| keep(*page_number))
                .map(|(_, id)| id),
        );
        self.objects.extend(doc.objects);

        Ok(())
    }

    /// Build the assembled document
    ///
    /// Objects that are no longer reachable from the new catalog (old catalogs,
    /// page tree nodes, dropped pages) are pruned.
    pub fn finish(self) -> Document {
        let mut doc = Document::with_version("1.5");

        // Add all collected objects FIRST
        doc.objects.extend(self.objects);

        // new_object_id() must not collide with the objects we just added
        doc.max_id = self.max_id - 1;

        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(self.page_ids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));

        let catalog_id = doc.new_object_id();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));

        doc.objects.insert(catalog_id, Object::Dictionary(catalog));
        doc.objects.insert(pages_id, Object::Dictionary(pages_object));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        for &page_id in &self.page_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        let pruned = doc.prune_objects();
        debug!(
            pages = self.page_ids.len(),
            pruned = pruned.len(),
            "Page tree assembled"
        );

        doc
    }
}

/// Merge multiple PDF files into a single PDF
///
/// Pages are concatenated in input-list order, then in page order within each
/// input. Parent directories of the output path are created if needed.
/// Returns the number of pages written.
///
/// # Example
///
/// ```no_run
/// use pdf_manager::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("first.pdf"),
///         PathBuf::from("second.pdf"),
///     ],
///     output_path: PathBuf::from("merged/both.pdf"),
/// };
///
/// merge_pdfs(&options).expect("Failed to merge");
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<usize> {
    if options.input_paths.is_empty() {
        return Err(Error::NoInputFiles);
    }

    // Validate all input files exist before loading any of them
    for path in &options.input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut assembler = PageAssembler::new();
    for path in &options.input_paths {
        info!("Adding {} to the merge list...", path.display());
        let pdf = PdfDocument::open(path)?;

        if pdf.page_count() == 0 {
            return Err(Error::EmptyPdf(path.clone()));
        }

        assembler.append(pdf, |_| true)?;
    }

    let page_count = assembler.page_count();
    let mut merged = assembler.finish();

    merged.compress();
    save_document(&mut merged, &options.output_path)?;

    info!("Merged PDF saved as {}", options.output_path.display());
    Ok(page_count)
}

/// Split a PDF into single-page files
///
/// Page `n` of `input` is written to `{output_dir}/{stem}_page_{n}.pdf`.
/// Returns the written paths in page order. Files written before a failure
/// are left on disk.
pub fn split_pdf(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let pdf = PdfDocument::open(input)?;
    let stem = file_stem(input);

    info!("Splitting PDF file: {}", input.display());
    info!("Number of pages: {}", pdf.page_count());

    fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for page_number in pdf.page_numbers() {
        let mut assembler = PageAssembler::new();
        assembler.append(pdf.clone(), |n| n == page_number)?;
        let mut single = assembler.finish();

        let path = output_dir.join(format!("{}_page_{}.pdf", stem, page_number));
        save_document(&mut single, &path)?;
        written.push(path);
    }

    info!("Split files list length: {}", written.len());
    Ok(written)
}

/// File name without directory or extension, e.g. `report` for `docs/report.pdf`
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_options_creation() {
        let options = MergeOptions {
            input_paths: vec![PathBuf::from("test1.pdf"), PathBuf::from("test2.pdf")],
            output_path: PathBuf::from("merged.pdf"),
        };

        assert_eq!(options.input_paths.len(), 2);
        assert_eq!(options.output_path, Path::new("merged.pdf"));
    }

    #[test]
    fn test_merge_empty_input_list() {
        let options = MergeOptions {
            input_paths: vec![],
            output_path: PathBuf::from("merged.pdf"),
        };
        assert!(matches!(merge_pdfs(&options), Err(Error::NoInputFiles)));
    }

    #[test]
    fn test_split_nonexistent_file() {
        let result = split_pdf(Path::new("nonexistent.pdf"), Path::new("out"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("docs/report.pdf")), "report");
        assert_eq!(file_stem(Path::new("archive.tar.pdf")), "archive.tar");
        assert_eq!(file_stem(Path::new("")), "document");
    }

    #[test]
    fn test_empty_assembler_builds_empty_tree() {
        let doc = PageAssembler::new().finish();
        assert!(doc.get_pages().is_empty());
        assert!(doc.trailer.get(b"Root").is_ok());
    }
}
