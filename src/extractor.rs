//! The extraction pipeline: decode → OCR → flatten → LLM → sanitize.
//!
//! [`Extractor`] owns the two collaborators for the life of the process and
//! runs one job at a time per call. Construction is where every startup
//! precondition is checked — credentials, model files — so per-job code can
//! assume a working pipeline and jobs fail only for job-scoped reasons.
//!
//! Within one job everything is sequential: each step consumes the previous
//! step's output and nothing is overlapped. The hosting runtime may call
//! [`Extractor::extract`] concurrently for independent jobs; all per-job data
//! is owned by the invocation and the collaborators are read-only.

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::llm::{self, CompletionClient};
use crate::ocr::{DocumentOcr, OcrsEngine};
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::{decode, flatten, sanitize};
use crate::prompts;
use edgequake_llm::ChatMessage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Long-lived extraction pipeline.
///
/// # Example
/// ```rust,no_run
/// use ratecon_extract::{Extractor, ExtractorConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Provider auto-detected from OPENAI_API_KEY etc.
///     let extractor = Extractor::new(ExtractorConfig::default())?;
///     let payload = std::fs::read("ratecon.pdf")?;
///     use base64::Engine as _;
///     let b64 = base64::engine::general_purpose::STANDARD.encode(&payload);
///     let output = extractor.extract(&b64).await?;
///     println!("{}", output.data);
///     Ok(())
/// }
/// ```
pub struct Extractor {
    ocr: Arc<dyn DocumentOcr>,
    client: Arc<dyn CompletionClient>,
    config: ExtractorConfig,
}

impl Extractor {
    /// Build the pipeline, validating every startup precondition.
    ///
    /// Resolves the LLM provider (failing fast when no credential is
    /// configured) and constructs the OCR engine (failing fast when model
    /// files cannot be located) unless pre-built collaborators were supplied
    /// in the config.
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        let client = llm::resolve_client(&config)?;

        let ocr: Arc<dyn DocumentOcr> = match config.ocr {
            Some(ref ocr) => Arc::clone(ocr),
            None => Arc::new(OcrsEngine::new(
                config.model_dir.as_deref(),
                config.dpi,
                config.max_rendered_pixels,
            )?),
        };

        Ok(Self {
            ocr,
            client,
            config,
        })
    }

    /// Run the full pipeline on one base64-encoded PDF.
    ///
    /// # Errors
    /// Returns `Err` for decode, OCR, and LLM failures. A completion that
    /// cannot be coerced into JSON is **not** an error: the sanitizer's
    /// `{"error": …}` descriptor comes back inside `ExtractionOutput::data`.
    pub async fn extract(&self, base64_pdf: &str) -> Result<ExtractionOutput, ExtractError> {
        let total_start = Instant::now();

        // ── Step 1: Decode ───────────────────────────────────────────────
        let pdf_bytes = decode::decode_pdf_payload(base64_pdf)?;
        info!("Decoded PDF payload: {} bytes", pdf_bytes.len());

        // ── Step 2: OCR ──────────────────────────────────────────────────
        // pdfium and the recogniser are CPU-bound and not async-safe; run
        // them on the blocking pool.
        let ocr_start = Instant::now();
        let ocr = Arc::clone(&self.ocr);
        let document = tokio::task::spawn_blocking(move || ocr.extract(&pdf_bytes))
            .await
            .map_err(|e| ExtractError::Internal(format!("OCR task panicked: {e}")))??;
        let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

        let page_count = document.pages.len();
        info!(
            "OCR complete: {} pages, {} words, {}ms",
            page_count,
            document.word_count(),
            ocr_duration_ms
        );

        // ── Step 3: Flatten ──────────────────────────────────────────────
        let ocr_text = flatten::flatten_document(&document);
        debug!("Flattened text: {} bytes", ocr_text.len());

        // ── Step 4: LLM completion ───────────────────────────────────────
        let system_prompt = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(prompts::SYSTEM_PROMPT);
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(prompts::build_user_prompt(&ocr_text)),
        ];

        let llm_start = Instant::now();
        let completion = self
            .client
            .complete(&messages, self.config.temperature, self.config.max_tokens)
            .await?;
        let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
        info!(
            "Completion received: {} tokens in / {} out, {}ms",
            completion.prompt_tokens, completion.completion_tokens, llm_duration_ms
        );

        // ── Step 5: Sanitize/parse ───────────────────────────────────────
        // Never fails; a completion that resists coercion becomes the
        // `{"error": …}` descriptor inside `data`.
        let data = sanitize::coerce_json(&completion.content);

        Ok(ExtractionOutput {
            data,
            ocr_text,
            stats: ExtractionStats {
                page_count,
                ocr_duration_ms,
                llm_duration_ms,
                total_duration_ms: total_start.elapsed().as_millis() as u64,
                prompt_tokens: completion.prompt_tokens,
                completion_tokens: completion.completion_tokens,
            },
        })
    }

    /// Synchronous wrapper around [`Extractor::extract`].
    ///
    /// Creates a temporary tokio runtime internally.
    pub fn extract_sync(&self, base64_pdf: &str) -> Result<ExtractionOutput, ExtractError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.extract(base64_pdf))
    }
}
