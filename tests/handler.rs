//! End-to-end handler tests with stub collaborators.
//!
//! Every test here runs the real pipeline — decode, flatten, prompt,
//! sanitize, envelope — with the two external collaborators (OCR, LLM)
//! replaced by stubs. No network, no pdfium, no model files.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ChatMessage;
use ratecon_extract::{
    Completion, CompletionClient, DocumentOcr, ExtractError, Extractor, ExtractorConfig,
    JobInput, JobRequest, OcrBlock, OcrDocument, OcrLine, OcrPage,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Stub collaborators ───────────────────────────────────────────────────────

/// OCR stub returning a fixed hierarchy regardless of input bytes.
struct StubOcr {
    document: OcrDocument,
}

impl DocumentOcr for StubOcr {
    fn extract(&self, _pdf_bytes: &[u8]) -> Result<OcrDocument, ExtractError> {
        Ok(self.document.clone())
    }
}

/// OCR stub that always fails, simulating an engine fault.
struct FailingOcr;

impl DocumentOcr for FailingOcr {
    fn extract(&self, _pdf_bytes: &[u8]) -> Result<OcrDocument, ExtractError> {
        Err(ExtractError::OcrFailed {
            detail: "detection model rejected the page".into(),
        })
    }
}

/// LLM stub returning a fixed completion and counting calls.
struct StubLlm {
    completion: String,
    calls: AtomicUsize,
}

impl StubLlm {
    fn new(completion: &str) -> Arc<Self> {
        Arc::new(Self {
            completion: completion.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompletionClient for StubLlm {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _temperature: f32,
        _max_tokens: usize,
    ) -> Result<Completion, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Completion {
            content: self.completion.clone(),
            prompt_tokens: 120,
            completion_tokens: 45,
        })
    }
}

/// LLM stub that always fails, simulating a provider outage.
struct FailingLlm;

#[async_trait]
impl CompletionClient for FailingLlm {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _temperature: f32,
        _max_tokens: usize,
    ) -> Result<Completion, ExtractError> {
        Err(ExtractError::LlmApi {
            message: "HTTP 503 from provider".into(),
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn page_of(lines: &[&str]) -> OcrPage {
    OcrPage {
        blocks: vec![OcrBlock {
            lines: lines.iter().map(|l| OcrLine::from_text(l)).collect(),
        }],
    }
}

/// The two-page confirmation every success-path test uses.
fn sample_document() -> OcrDocument {
    OcrDocument {
        pages: vec![
            page_of(&["LOAD CONFIRMATION", "Broker: Apex Freight Brokerage LLC"]),
            page_of(&["Total Carrier Pay: $1,850.00"]),
        ],
    }
}

fn pdf_payload() -> String {
    STANDARD.encode(b"%PDF-1.4 synthetic test document")
}

fn extractor_with(ocr: Arc<dyn DocumentOcr>, llm: Arc<dyn CompletionClient>) -> Extractor {
    let config = ExtractorConfig::builder()
        .ocr(ocr)
        .client(llm)
        .build()
        .expect("valid config");
    Extractor::new(config).expect("stubbed pipeline always constructs")
}

const GOOD_COMPLETION: &str = r#"```json
{
  "load_details": {
    "broker_name": "Apex Freight Brokerage LLC",
    "load_confirmation_number": "LC-44021"
  },
  "financial": {
    "total_carrier_pay": "$1,850.00"
  }
}
```"#;

// ── Success path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_extraction_succeeds_with_stubbed_collaborators() {
    let llm = StubLlm::new(GOOD_COMPLETION);
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        llm.clone(),
    );

    let response = extractor
        .handle(&JobRequest::from_base64(pdf_payload()))
        .await;

    assert!(response.success, "error: {:?}", response.error);
    assert!(response.error.is_none());

    let data = response.data.expect("data present on success");
    assert_eq!(
        data["load_details"]["broker_name"],
        "Apex Freight Brokerage LLC"
    );
    assert_eq!(data["financial"]["total_carrier_pay"], "$1,850.00");
}

#[tokio::test]
async fn llm_is_called_exactly_once_per_job() {
    let llm = StubLlm::new("{}");
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        llm.clone(),
    );

    let _ = extractor
        .handle(&JobRequest::from_base64(pdf_payload()))
        .await;

    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn extract_reports_flattened_text_and_stats() {
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        StubLlm::new("{}"),
    );

    let output = extractor.extract(&pdf_payload()).await.unwrap();

    // Traversal order, words space-joined, lines newline-joined.
    assert_eq!(
        output.ocr_text,
        "LOAD CONFIRMATION\nBroker: Apex Freight Brokerage LLC\nTotal Carrier Pay: $1,850.00"
    );
    assert_eq!(output.stats.page_count, 2);
    assert_eq!(output.stats.prompt_tokens, 120);
    assert_eq!(output.stats.completion_tokens, 45);
}

// ── Content-quality failures are still successful jobs ───────────────────────

#[tokio::test]
async fn unparseable_completion_is_success_with_error_data() {
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        StubLlm::new("I'm sorry, I could not find any structured data here."),
    );

    let response = extractor
        .handle(&JobRequest::from_base64(pdf_payload()))
        .await;

    // Transport succeeded; the content is the problem.
    assert!(response.success);
    assert!(response.error.is_none());

    let data = response.data.unwrap();
    let msg = data["error"].as_str().expect("error descriptor in data");
    assert!(msg.starts_with("JSON parsing error:"), "got: {msg}");
}

// ── Input errors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_pdf_field_returns_normalized_failure_envelope() {
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        StubLlm::new("{}"),
    );

    let request = JobRequest {
        input: JobInput { base64_pdf: None },
    };
    let response = extractor.handle(&request).await;

    assert!(!response.success);
    assert_eq!(response.data, None);
    assert_eq!(response.error.as_deref(), Some("No PDF data provided"));
}

#[tokio::test]
async fn invalid_base64_fails_the_job_without_panicking() {
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        StubLlm::new("{}"),
    );

    let response = extractor
        .handle(&JobRequest::from_base64("@@not-base64@@"))
        .await;

    assert!(!response.success);
    let err = response.error.unwrap();
    assert!(err.starts_with("Invalid base64 PDF data"), "got: {err}");
}

#[tokio::test]
async fn valid_base64_of_non_pdf_bytes_fails_the_job() {
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        StubLlm::new("{}"),
    );

    let payload = STANDARD.encode(b"hello world, definitely not a PDF");
    let response = extractor.handle(&JobRequest::from_base64(payload)).await;

    assert!(!response.success);
    assert!(response.error.is_some());
    assert_eq!(response.data, None);
}

// ── Collaborator failures ────────────────────────────────────────────────────

#[tokio::test]
async fn ocr_failure_becomes_a_failure_envelope() {
    let extractor = extractor_with(Arc::new(FailingOcr), StubLlm::new("{}"));

    let response = extractor
        .handle(&JobRequest::from_base64(pdf_payload()))
        .await;

    assert!(!response.success);
    let err = response.error.unwrap();
    assert!(err.contains("OCR failed"), "got: {err}");
}

#[tokio::test]
async fn llm_failure_becomes_a_failure_envelope() {
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        Arc::new(FailingLlm),
    );

    let response = extractor
        .handle(&JobRequest::from_base64(pdf_payload()))
        .await;

    assert!(!response.success);
    let err = response.error.unwrap();
    assert!(err.contains("LLM API error"), "got: {err}");
    assert!(err.contains("503"));
}

// ── Raw payload boundary ─────────────────────────────────────────────────────

#[tokio::test]
async fn handle_json_round_trips_the_wire_shape() {
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        StubLlm::new(GOOD_COMPLETION),
    );

    let raw = serde_json::to_string(&serde_json::json!({
        "input": { "base64_pdf": pdf_payload() }
    }))
    .unwrap();

    let response = extractor.handle_json(&raw).await;
    assert!(response.success);
    assert_eq!(
        response.data.unwrap()["load_details"]["broker_name"],
        "Apex Freight Brokerage LLC"
    );
}

#[tokio::test]
async fn handle_json_rejects_malformed_payloads_gracefully() {
    let extractor = extractor_with(
        Arc::new(StubOcr {
            document: sample_document(),
        }),
        StubLlm::new("{}"),
    );

    let response = extractor.handle_json("{ this is not json").await;

    assert!(!response.success);
    assert!(response
        .error
        .unwrap()
        .starts_with("Invalid job payload"));
}

#[tokio::test]
async fn envelope_serialises_with_explicit_nulls() {
    let extractor = extractor_with(Arc::new(FailingOcr), StubLlm::new("{}"));

    let response = extractor
        .handle(&JobRequest::from_base64(pdf_payload()))
        .await;
    let wire = serde_json::to_value(&response).unwrap();

    assert_eq!(wire["success"], false);
    assert_eq!(wire["data"], Value::Null);
    assert!(wire["error"].is_string());
}
