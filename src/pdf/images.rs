//! Embedded image extraction

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::document::{ImageResource, PdfDocument};
use crate::error::Result;

/// Write every image XObject of a PDF to `output_dir`
///
/// Images are named `page{n}_image{i}_{name}.{ext}`, where `i` counts the
/// images saved so far on page `n`, starting at zero. An image that cannot be
/// written is logged and skipped. Returns the total number of images written.
#[instrument(skip_all, fields(input = %input.display(), output_dir = %output_dir.display()))]
pub fn extract_images(input: &Path, output_dir: &Path) -> Result<usize> {
    let pdf = PdfDocument::open(input)?;
    fs::create_dir_all(output_dir)?;

    info!(
        "PDF document contains {} pages to search for images.",
        pdf.page_count()
    );

    let mut total_images_extracted = 0;

    for page_number in pdf.page_numbers() {
        info!("Processing page {}...", page_number);

        let images = match pdf.images(page_number) {
            Ok(images) => images,
            Err(e) => {
                warn!(page_number, error = %e, "Could not read page resources");
                continue;
            }
        };

        let mut image_count = 0;
        for image in &images {
            let path = output_dir.join(image_file_name(page_number, image_count, image));
            match fs::write(&path, &image.data) {
                Ok(()) => {
                    info!("Image saved: {}", path.display());
                    image_count += 1;
                    total_images_extracted += 1;
                }
                Err(e) => {
                    warn!(
                        "Failed to save image {} from page {}: {}",
                        image.name, page_number, e
                    );
                }
            }
        }
    }

    info!(
        "Extraction complete. Total images extracted: {}",
        total_images_extracted
    );
    Ok(total_images_extracted)
}

/// File name for the `index`-th image of a page
fn image_file_name(page_number: u32, index: usize, image: &ImageResource) -> PathBuf {
    PathBuf::from(format!(
        "page{}_image{}_{}.{}",
        page_number,
        index,
        sanitize_name(&image.name),
        image.extension
    ))
}

/// Keep resource names safe to use as file names
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn image(name: &str, extension: &'static str) -> ImageResource {
        ImageResource {
            name: name.to_string(),
            data: vec![0xFF, 0xD8],
            extension,
        }
    }

    #[test]
    fn test_image_file_name() {
        let name = image_file_name(3, 0, &image("Im0", "jpg"));
        assert_eq!(name, PathBuf::from("page3_image0_Im0.jpg"));
    }

    #[test]
    fn test_image_file_name_sanitizes_resource_name() {
        let name = image_file_name(1, 2, &image("../Im 1", "raw"));
        assert_eq!(name, PathBuf::from("page1_image2_.._Im_1.raw"));
    }

    #[test]
    fn test_extract_images_nonexistent_file() {
        let result = extract_images(Path::new("nonexistent.pdf"), Path::new("images"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
