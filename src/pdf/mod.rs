//! PDF manipulation module

pub mod crypt;
pub mod document;
pub mod images;
pub mod merge;
pub mod metadata;
pub mod transform;
pub mod watermark;

// Re-export commonly used items
pub use crypt::{decrypt_aes256, encrypt_aes256};
pub use document::{ImageResource, PageText, PdfDocument};
pub use images::extract_images;
pub use merge::{merge_pdfs, split_pdf, MergeOptions, PageAssembler};
pub use metadata::{extract_info, extract_metadata, Metadata, PdfInfo};
pub use transform::{crop_and_transform_sample, rotate_pdf};
pub use watermark::{watermark_pdf, WatermarkOptions};
