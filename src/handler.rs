//! Job envelope: the wire-level request and response shapes.
//!
//! One job in, one envelope out. Every path through the handler — including
//! the missing-field case — returns the same
//! `{"success": bool, "data": object|null, "error": string|null}` shape, so
//! consumers can branch on `success` first and inspect `data.error` second.
//!
//! The `success` flag distinguishes transport/processing failures from
//! content-quality failures: a job that decoded, OCR'd, and got a completion
//! back is successful even when the completion resisted JSON coercion — in
//! that case `data` carries the sanitizer's `{"error": …}` descriptor.

use crate::error::ExtractError;
use crate::extractor::Extractor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// One job's input: `{"input": {"base64_pdf": "…"}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub input: JobInput,
}

/// The inner input mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobInput {
    /// Base64-encoded PDF payload. Absent ⇒ the job fails immediately.
    #[serde(default)]
    pub base64_pdf: Option<String>,
}

impl JobRequest {
    /// Build a request from a raw base64 payload.
    pub fn from_base64(base64_pdf: impl Into<String>) -> Self {
        Self {
            input: JobInput {
                base64_pdf: Some(base64_pdf.into()),
            },
        }
    }
}

/// The uniform response envelope, returned once per job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl JobResponse {
    fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

impl Extractor {
    /// Process one job and return its envelope. Never fails: every error is
    /// converted into a `success: false` envelope at this boundary.
    pub async fn handle(&self, request: &JobRequest) -> JobResponse {
        let Some(payload) = request.input.base64_pdf.as_deref() else {
            return JobResponse::failure(ExtractError::MissingPdfField.to_string());
        };

        match self.extract(payload).await {
            Ok(output) => JobResponse::ok(output.data),
            Err(e) => {
                warn!("Job failed: {e}");
                JobResponse::failure(e.to_string())
            }
        }
    }

    /// Process a raw JSON job payload.
    ///
    /// A payload that does not deserialise into [`JobRequest`] becomes a
    /// failure envelope rather than an error, keeping the boundary total.
    pub async fn handle_json(&self, raw: &str) -> JobResponse {
        match serde_json::from_str::<JobRequest>(raw) {
            Ok(request) => self.handle(&request).await,
            Err(e) => JobResponse::failure(format!("Invalid job payload: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_parses_the_wire_shape() {
        let req: JobRequest =
            serde_json::from_str(r#"{"input": {"base64_pdf": "JVBERg=="}}"#).unwrap();
        assert_eq!(req.input.base64_pdf.as_deref(), Some("JVBERg=="));
    }

    #[test]
    fn request_tolerates_a_missing_pdf_field() {
        let req: JobRequest = serde_json::from_str(r#"{"input": {}}"#).unwrap();
        assert!(req.input.base64_pdf.is_none());
    }

    #[test]
    fn envelope_always_carries_all_three_keys() {
        let ok = serde_json::to_value(JobResponse::ok(json!({"a": 1}))).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"]["a"], 1);
        assert_eq!(ok["error"], Value::Null);

        let fail = serde_json::to_value(JobResponse::failure("boom".into())).unwrap();
        assert_eq!(fail["success"], false);
        assert_eq!(fail["data"], Value::Null);
        assert_eq!(fail["error"], "boom");
    }
}
