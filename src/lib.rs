//! PDF Manager Library
//!
//! Everyday PDF manipulation built on lopdf and qpdf:
//! - Extract page counts, text and metadata
//! - Split into single pages and merge documents
//! - Rotate pages and run the fixed crop example
//! - Encrypt and decrypt with AES-256
//! - Extract embedded images
//! - Stamp a text watermark on every page
//!
//! The [`menu`] module drives these operations from an interactive prompt.
//!
//! # Example
//!
//! ```no_run
//! use pdf_manager::pdf::{MergeOptions, merge_pdfs};
//! use std::path::PathBuf;
//!
//! let options = MergeOptions {
//!     input_paths: vec![
//!         PathBuf::from("intro.pdf"),
//!         PathBuf::from("advanced.pdf"),
//!     ],
//!     output_path: PathBuf::from("merged.pdf"),
//! };
//!
//! merge_pdfs(&options).expect("Failed to merge PDFs");
//! ```

pub mod config;
pub mod date;
pub mod error;
pub mod layout;
pub mod menu;
pub mod pdf;
pub mod service;

// Re-export commonly used items
pub use config::Settings;
pub use error::{Error, Result};
pub use service::DocumentService;
