//! Runtime settings
//!
//! Built once at startup from the command line (or environment) and passed
//! by reference afterwards; nothing mutates it.

use std::path::PathBuf;

/// Default directory for split pages and the cropped sample
pub const DEFAULT_SPLIT_DIR: &str = "./treated_documents";
/// Default directory for extracted images
pub const DEFAULT_IMAGES_DIR: &str = "./extracted_images";

/// Output locations for operations that derive their own file names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Where `split` and `crop` write their output
    pub split_dir: PathBuf,
    /// Default directory for `extract_images`
    pub images_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            split_dir: PathBuf::from(DEFAULT_SPLIT_DIR),
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directories() {
        let settings = Settings::default();
        assert_eq!(settings.split_dir, PathBuf::from("./treated_documents"));
        assert_eq!(settings.images_dir, PathBuf::from("./extracted_images"));
    }
}
