//! AES-256 password protection through qpdf

use std::fs;
use std::path::Path;

use qpdf::{EncryptionParams, EncryptionParamsR6, PrintPermission, QPdf, QPdfError, QPdfErrorCode};
use tracing::{info, instrument};

use super::document::ensure_parent_dir;
use crate::error::{Error, Result};

/// Encrypt a PDF with AES-256 (security handler revision 6)
///
/// The owner and user passwords are both set to `password`. All permissions
/// are granted to a reader who knows the password.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn encrypt_aes256(input: &Path, output: &Path, password: &str) -> Result<()> {
    let data = read_input(input)?;

    // An input that is already protected cannot be opened without its password
    let qpdf = QPdf::read_from_memory(&data).map_err(map_encryption_error)?;

    let encryption = EncryptionParams::R6(EncryptionParamsR6 {
        user_password: password.to_string(),
        owner_password: password.to_string(),
        allow_accessibility: true,
        allow_extract: true,
        allow_assemble: true,
        allow_annotate_and_form: true,
        allow_form_filling: true,
        allow_modify_other: true,
        allow_print: PrintPermission::Full,
        encrypt_metadata: true,
    });

    let mut writer = qpdf.writer();
    writer
        .preserve_encryption(false)
        .encryption_params(encryption);
    let encrypted = writer.write_to_memory().map_err(map_encryption_error)?;

    write_output(output, &encrypted)?;
    info!("PDF encrypted with AES-256 and saved as {}", output.display());
    Ok(())
}

/// Remove password protection from a PDF
///
/// A password that does not unlock the document fails with
/// [`Error::IncorrectPassword`] and no output file is written.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn decrypt_aes256(input: &Path, output: &Path, password: &str) -> Result<()> {
    let data = read_input(input)?;

    let qpdf = QPdf::read_from_memory_encrypted(&data, password).map_err(|e| {
        match e.error_code() {
            QPdfErrorCode::InvalidPassword => Error::IncorrectPassword,
            _ => Error::Qpdf(e.to_string()),
        }
    })?;

    let mut writer = qpdf.writer();
    writer.preserve_encryption(false);
    let decrypted = writer.write_to_memory().map_err(map_encryption_error)?;

    write_output(output, &decrypted)?;
    info!("PDF decrypted and saved as {}", output.display());
    Ok(())
}

fn map_encryption_error(e: QPdfError) -> Error {
    match e.error_code() {
        QPdfErrorCode::InvalidPassword => Error::PasswordError(e.to_string()),
        _ => Error::Qpdf(e.to_string()),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, data)?;
    Ok(())
}
