//! Input decoding: base64 payload → validated PDF bytes.
//!
//! Malformed input is the most common client error, so both failure modes
//! get their own named variants: [`ExtractError::InvalidBase64`] for a payload
//! that does not decode, [`ExtractError::NotAPdf`] for one that decodes to
//! something other than a PDF. Checking the `%PDF` magic here gives callers a
//! meaningful error instead of a pdfium failure deep in the OCR stage.

use crate::error::ExtractError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Decode a base64 payload and verify it is a PDF.
pub fn decode_pdf_payload(payload: &str) -> Result<Vec<u8>, ExtractError> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ExtractError::InvalidBase64 {
            detail: e.to_string(),
        })?;

    ensure_pdf(&bytes)?;
    Ok(bytes)
}

/// Verify the `%PDF` magic prefix.
fn ensure_pdf(bytes: &[u8]) -> Result<(), ExtractError> {
    let mut magic = [0u8; 4];
    let head = bytes.get(..4).ok_or(ExtractError::NotAPdf { magic })?;
    magic.copy_from_slice(head);
    if &magic != PDF_MAGIC {
        return Err(ExtractError::NotAPdf { magic });
    }
    Ok(())
}
