//! One handler per menu entry

use std::io::Write;

use super::{Args, Param, ParamKind};
use crate::error::Result;
use crate::service::DocumentService;

/// A menu operation: the parameters it needs and how it prints its result
pub trait Handler: Sync {
    fn params(&self) -> &'static [Param];

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()>;
}

const INPUT: Param = Param::required("input", "Enter the pdf filename: ", ParamKind::Path);
const OUTPUT: Param = Param::required(
    "output",
    "Enter the output PDF document path: ",
    ParamKind::Path,
);
const MERGE_INPUTS: Param = Param::required(
    "inputs",
    "Enter the pdf document to merge in proper order: ",
    ParamKind::PathList,
);
const MERGE_OUTPUT: Param = Param::required(
    "output",
    "Enter file path where to save the file: ",
    ParamKind::Path,
);
const ANGLE: Param = Param::required(
    "angle",
    "Enter the rotation angle in degrees (multiple of 90): ",
    ParamKind::Angle,
);
const PASSWORD: Param = Param::required("password", "Enter your password: ", ParamKind::Secret);
const DECRYPT_PASSWORD: Param = Param::required(
    "password",
    "Enter the password to decrypt the PDF: ",
    ParamKind::Secret,
);
const IMAGE_SOURCE: Param = Param::required(
    "input",
    "Enter the pdf file path or filename for image search: ",
    ParamKind::Path,
);
const IMAGES_DIR: Param = Param::optional(
    "output_dir",
    "Enter the directory for extracted images (blank for default): ",
    ParamKind::Path,
);
const CROP_INPUT: Param = Param::required("input", "Enter the PDF document path: ", ParamKind::Path);
const WATERMARK_INPUT: Param = Param::required(
    "input",
    "What is the file path of the pdf you want to watermark: ",
    ParamKind::Path,
);
const WATERMARK_OUTPUT: Param = Param::required(
    "output",
    "What is the file path of the output pdf you watermarked: ",
    ParamKind::Path,
);
const WATERMARK_TEXT: Param = Param::required("text", "Type watermark text here: ", ParamKind::Text);

pub struct ReadText;

impl Handler for ReadText {
    fn params(&self) -> &'static [Param] {
        &[INPUT]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let (page_count, pages) = service.read_document(&args.path("input")?);

        writeln!(out)?;
        writeln!(out, "{}", "*".repeat(80))?;
        writeln!(out, "Document total pages: {page_count}")?;
        for page in pages {
            writeln!(out, "Page {}:", page.page_number)?;
            writeln!(out, "{}", page.text)?;
            writeln!(out, "{}", "-".repeat(70))?;
        }
        Ok(())
    }
}

pub struct ShowMetadata;

impl Handler for ShowMetadata {
    fn params(&self) -> &'static [Param] {
        &[INPUT]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let metadata = service.get_metadata(&args.path("input")?);

        writeln!(out, "PDF Metadata:")?;
        for (key, value) in metadata.entries() {
            writeln!(out, "{}: {}", key, value.unwrap_or("None"))?;
        }
        Ok(())
    }
}

pub struct Split;

impl Handler for Split {
    fn params(&self) -> &'static [Param] {
        &[INPUT]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let files = service.split_document(&args.path("input")?);

        writeln!(out, "Split files:")?;
        for file in files {
            writeln!(out, "{}", file.display())?;
        }
        Ok(())
    }
}

pub struct Merge;

impl Handler for Merge {
    fn params(&self) -> &'static [Param] {
        &[MERGE_INPUTS, MERGE_OUTPUT]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let inputs = args.paths("inputs")?;
        let output = args.path("output")?;

        let page_count = service.merge_documents(&inputs, &output)?;
        writeln!(
            out,
            "Merged PDF saved as {} ({} pages)",
            output.display(),
            page_count
        )?;
        Ok(())
    }
}

pub struct Rotate;

impl Handler for Rotate {
    fn params(&self) -> &'static [Param] {
        &[INPUT, OUTPUT, ANGLE]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let output = args.path("output")?;
        service.rotate_document(&args.path("input")?, &output, args.angle("angle")?)?;
        writeln!(out, "Rotated PDF saved as {}", output.display())?;
        Ok(())
    }
}

pub struct Encrypt;

impl Handler for Encrypt {
    fn params(&self) -> &'static [Param] {
        &[INPUT, PASSWORD, OUTPUT]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let output = args.path("output")?;
        service.encrypt_aes256(&args.path("input")?, &output, args.text("password")?)?;
        writeln!(out, "PDF encrypted with AES-256 and saved as {}", output.display())?;
        Ok(())
    }
}

pub struct Decrypt;

impl Handler for Decrypt {
    fn params(&self) -> &'static [Param] {
        &[INPUT, DECRYPT_PASSWORD, OUTPUT]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let output = args.path("output")?;
        service.decrypt_aes256(&args.path("input")?, &output, args.text("password")?)?;
        writeln!(out, "PDF decrypted and saved as {}", output.display())?;
        Ok(())
    }
}

pub struct ExtractImages;

impl Handler for ExtractImages {
    fn params(&self) -> &'static [Param] {
        &[IMAGE_SOURCE, IMAGES_DIR]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let output_dir = args.optional_path("output_dir");
        let total = service.extract_images(&args.path("input")?, output_dir.as_deref())?;
        writeln!(out, "Extraction complete. Total images extracted: {total}")?;
        Ok(())
    }
}

pub struct Crop;

impl Handler for Crop {
    fn params(&self) -> &'static [Param] {
        &[CROP_INPUT]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let output = service.crop_and_transform_sample(&args.path("input")?)?;
        writeln!(out, "Cropped PDF saved as {}", output.display())?;
        Ok(())
    }
}

pub struct Watermark;

impl Handler for Watermark {
    fn params(&self) -> &'static [Param] {
        &[WATERMARK_INPUT, WATERMARK_OUTPUT, WATERMARK_TEXT]
    }

    fn run(&self, service: &DocumentService, args: &Args, out: &mut dyn Write) -> Result<()> {
        let output = args.path("output")?;
        service.watermark(&args.path("input")?, &output, args.text("text")?)?;
        writeln!(out, "Watermarked PDF saved as {}", output.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_metadata_prints_none_for_absent_keys() {
        let service = DocumentService::default();
        let args = Args::new().with("input", "nonexistent.pdf");
        let mut out = Vec::new();

        ShowMetadata.run(&service, &args, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("PDF Metadata:\n"));
        assert!(text.contains("creator: None\n"));
        assert!(text.contains("creation_date: None\n"));
    }

    #[test]
    fn test_missing_argument_is_reported() {
        let service = DocumentService::default();
        let mut out = Vec::new();
        let result = Rotate.run(&service, &Args::new(), &mut out);
        assert!(matches!(result, Err(Error::MissingParameter(_))));
    }

    #[test]
    fn test_rotate_rejects_malformed_angle() {
        let service = DocumentService::default();
        let args = Args::new()
            .with("input", "in.pdf")
            .with("output", "out.pdf")
            .with("angle", "ninety");
        let mut out = Vec::new();
        let result = Rotate.run(&service, &args, &mut out);
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }
}
