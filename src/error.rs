//! Error types for the ratecon-extract library.
//!
//! One enum covers every failure the pipeline can surface, grouped by the
//! job taxonomy:
//!
//! * **Input errors** — the caller sent something malformed (missing field,
//!   bad base64, not a PDF). The job never starts.
//! * **Collaborator errors** — the OCR engine or the LLM call failed. The
//!   orchestrator converts these into a `success: false` envelope.
//! * **Startup errors** — missing credentials or model files. These are
//!   raised from [`crate::extractor::Extractor::new`], never per-job.
//!
//! A completion that cannot be coerced into JSON is deliberately *not* an
//! error: the sanitizer reports it inside the job's `data` payload, because a
//! malformed LLM response is an expected outcome, not a system fault.

use thiserror::Error;

/// All errors returned by the ratecon-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The job input had no `base64_pdf` field.
    #[error("No PDF data provided")]
    MissingPdfField,

    /// The `base64_pdf` field was not valid base64.
    #[error("Invalid base64 PDF data: {detail}")]
    InvalidBase64 { detail: String },

    /// The decoded bytes do not start with the `%PDF` magic.
    #[error("Decoded payload is not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: [u8; 4] },

    // ── PDF / OCR errors ──────────────────────────────────────────────────
    /// pdfium could not parse the document structure.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The OCR engine failed on a page image.
    #[error("OCR failed: {detail}")]
    OcrFailed { detail: String },

    /// Detection/recognition model files could not be found or fetched.
    #[error(
        "OCR model files unavailable: {detail}\n\
         Place text-detection.rten and text-recognition.rten in a model \
         directory (see RATECON_MODEL_DIR) or allow the auto-download to run."
    )]
    OcrModelsUnavailable { detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No LLM provider could be constructed (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API call failed.
    #[error("LLM API error: {message}")]
    LlmApi { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Whether this error is a client-input problem rather than a fault in
    /// the pipeline or its collaborators.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExtractError::MissingPdfField
                | ExtractError::InvalidBase64 { .. }
                | ExtractError::NotAPdf { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display_matches_wire_message() {
        assert_eq!(
            ExtractError::MissingPdfField.to_string(),
            "No PDF data provided"
        );
    }

    #[test]
    fn invalid_base64_display() {
        let e = ExtractError::InvalidBase64 {
            detail: "Invalid symbol 33".into(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Invalid base64 PDF data"), "got: {msg}");
        assert!(msg.contains("Invalid symbol 33"));
    }

    #[test]
    fn not_a_pdf_display_includes_magic() {
        let e = ExtractError::NotAPdf { magic: *b"hell" };
        assert!(e.to_string().contains("104"), "got: {}", e);
    }

    #[test]
    fn provider_not_configured_display() {
        let e = ExtractError::ProviderNotConfigured {
            provider: "openai".into(),
            hint: "Set OPENAI_API_KEY".into(),
        };
        assert!(e.to_string().contains("openai"));
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn input_error_classification() {
        assert!(ExtractError::MissingPdfField.is_input_error());
        assert!(ExtractError::NotAPdf { magic: [0; 4] }.is_input_error());
        assert!(!ExtractError::LlmApi {
            message: "boom".into()
        }
        .is_input_error());
    }
}
