//! Error types for the PDF manager library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF manager library
#[derive(Error, Debug)]
pub enum Error {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but is not a readable PDF
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// qpdf failed to read or write the document
    #[error("qpdf error: {0}")]
    Qpdf(String),

    /// Malformed or unsupported encryption on the input
    #[error("Password error: {0}")]
    PasswordError(String),

    /// The supplied password does not unlock the document
    #[error("Incorrect password. Decryption failed.")]
    IncorrectPassword,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Menu selection outside the known operations
    #[error("Unsupported selection: {0}")]
    UnsupportedSelection(i64),

    /// Input that could not be parsed (menu choice, angle, ...)
    #[error("Malformed input: {0:?}")]
    MalformedInput(String),

    /// A handler was invoked without one of its declared parameters
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// No input files given to a multi-file operation
    #[error("No input files provided")]
    NoInputFiles,

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// The document is too short for the requested transform
    #[error("{} has {found} pages, at least {required} required", .path.display())]
    NotEnoughPages {
        path: PathBuf,
        required: usize,
        found: usize,
    },

    /// Page number outside the document
    #[error("Page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: usize },

    /// Rotation that is not a quarter turn
    #[error("Rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i64),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),
}
