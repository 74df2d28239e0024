//! # ratecon-extract
//!
//! Extract structured data from trucking load-confirmation ("rate
//! confirmation") PDFs using OCR and an LLM.
//!
//! ## Why this crate?
//!
//! Rate confirmations arrive as faxed, scanned, or print-to-PDF documents
//! with wildly inconsistent layouts. Template-based parsers break on every
//! new broker. Instead this crate OCRs the document, hands the recognised
//! text to an LLM with a fixed extraction prompt, and coerces the response
//! into a JSON structure covering rates, stops, references, and equipment.
//!
//! ## Pipeline Overview
//!
//! ```text
//! base64 PDF
//!  │
//!  ├─ 1. Decode    base64 → bytes, %PDF magic check
//!  ├─ 2. OCR       pdfium rasterisation + ocrs recognition (spawn_blocking)
//!  ├─ 3. Flatten   pages → blocks → lines → words, order-preserving text
//!  ├─ 4. LLM       one deterministic completion (temperature 0)
//!  ├─ 5. Sanitize  strip fences, pad braces, parse JSON (best-effort)
//!  └─ 6. Envelope  {success, data, error}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ratecon_extract::{Extractor, ExtractorConfig, JobRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let extractor = Extractor::new(ExtractorConfig::default())?;
//!
//!     let payload = std::fs::read("ratecon.pdf")?;
//!     use base64::Engine as _;
//!     let b64 = base64::engine::general_purpose::STANDARD.encode(&payload);
//!
//!     let response = extractor.handle(&JobRequest::from_base64(b64)).await;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Decode, OCR, and LLM failures produce `{success: false, error: …}`. A
//! completion that cannot be coerced into JSON is *not* a failure — the job
//! succeeds and `data` carries `{"error": …}` for the caller to inspect.
//! Startup problems (no API key, missing OCR models) fail
//! [`Extractor::new`], never an individual job.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ratecon` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ratecon-extract = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod llm;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractorConfig, ExtractorConfigBuilder};
pub use error::ExtractError;
pub use extractor::Extractor;
pub use handler::{JobInput, JobRequest, JobResponse};
pub use llm::{Completion, CompletionClient};
pub use ocr::{DocumentOcr, OcrBlock, OcrDocument, OcrLine, OcrPage, OcrWord};
pub use output::{ExtractionOutput, ExtractionStats};
pub use pipeline::sanitize::coerce_json;
