//! Document operations
//!
//! One method per menu entry. Each call opens its own documents and owns
//! them until it returns, so a failure never affects another call.
//!
//! `read_document`, `get_metadata` and `split_document` log failures and
//! return an empty result; every other operation returns the error.

use std::path::{Path, PathBuf};

use tracing::error;

use crate::config::Settings;
use crate::error::Result;
use crate::pdf::{self, MergeOptions, Metadata, PageText, PdfDocument, WatermarkOptions};

/// Entry point for the document operations
#[derive(Debug, Clone, Default)]
pub struct DocumentService {
    settings: Settings,
}

impl DocumentService {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Page count and the text of every page
    ///
    /// Returns `(0, [])` if the file cannot be read.
    pub fn read_document(&self, path: &Path) -> (usize, Vec<PageText>) {
        match PdfDocument::open(path) {
            Ok(pdf) => (pdf.page_count(), pdf.pages_text()),
            Err(e) => {
                error!("An error occurred while reading the PDF: {}", e);
                (0, Vec::new())
            }
        }
    }

    /// Document information, all `None` if the file cannot be read
    pub fn get_metadata(&self, path: &Path) -> Metadata {
        pdf::extract_metadata(path).unwrap_or_else(|e| {
            error!("An error occurred while reading the PDF: {}", e);
            Metadata::default()
        })
    }

    /// Split into single-page files under the split directory
    ///
    /// Returns an empty list on any failure; pages already written stay on disk.
    pub fn split_document(&self, path: &Path) -> Vec<PathBuf> {
        pdf::split_pdf(path, &self.settings.split_dir).unwrap_or_else(|e| {
            error!("An error occurred while splitting the PDF: {}", e);
            Vec::new()
        })
    }

    /// Concatenate `inputs` into `output`, returning the page count
    pub fn merge_documents(&self, inputs: &[PathBuf], output: &Path) -> Result<usize> {
        pdf::merge_pdfs(&MergeOptions {
            input_paths: inputs.to_vec(),
            output_path: output.to_path_buf(),
        })
    }

    /// Rotate every page clockwise by `angle` degrees
    pub fn rotate_document(&self, input: &Path, output: &Path, angle: i64) -> Result<()> {
        pdf::rotate_pdf(input, output, angle)
    }

    /// The fixed three-page crop example, written under the split directory
    pub fn crop_and_transform_sample(&self, input: &Path) -> Result<PathBuf> {
        pdf::crop_and_transform_sample(input, &self.settings.split_dir)
    }

    /// Save embedded images, to `output_dir` or the configured images directory
    pub fn extract_images(&self, input: &Path, output_dir: Option<&Path>) -> Result<usize> {
        let output_dir = output_dir.unwrap_or(&self.settings.images_dir);
        pdf::extract_images(input, output_dir)
    }

    pub fn encrypt_aes256(&self, input: &Path, output: &Path, password: &str) -> Result<()> {
        pdf::encrypt_aes256(input, output, password)
    }

    pub fn decrypt_aes256(&self, input: &Path, output: &Path, password: &str) -> Result<()> {
        pdf::decrypt_aes256(input, output, password)
    }

    /// Stamp `text` diagonally across every page, returning the page count
    pub fn watermark(&self, input: &Path, output: &Path, text: &str) -> Result<usize> {
        pdf::watermark_pdf(input, output, &WatermarkOptions::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_document_returns_empty() {
        let service = DocumentService::default();
        let (count, pages) = service.read_document(Path::new("nonexistent.pdf"));
        assert_eq!(count, 0);
        assert!(pages.is_empty());
    }

    #[test]
    fn test_metadata_of_missing_document_is_all_none() {
        let service = DocumentService::default();
        let metadata = service.get_metadata(Path::new("nonexistent.pdf"));
        assert!(metadata.entries().iter().all(|(_, value)| value.is_none()));
    }

    #[test]
    fn test_split_missing_document_returns_empty() {
        let service = DocumentService::default();
        assert!(service.split_document(Path::new("nonexistent.pdf")).is_empty());
    }
}
