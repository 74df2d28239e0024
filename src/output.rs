//! Output types returned by the typed extraction API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of extracting one load-confirmation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// The coerced JSON structure. Either the model's extraction or the
    /// sanitizer's `{"error": …}` descriptor when the completion could not
    /// be parsed — reaching this field at all means the pipeline itself
    /// succeeded.
    pub data: Value,

    /// The flattened OCR text that was sent to the model. Useful for
    /// auditing what the model actually saw.
    pub ocr_text: String,

    /// Timing and token accounting for the run.
    pub stats: ExtractionStats,
}

/// Timing and token statistics for one extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub page_count: usize,
    /// Wall-clock time spent rasterising and recognising.
    pub ocr_duration_ms: u64,
    /// Wall-clock time spent in the LLM call.
    pub llm_duration_ms: u64,
    /// End-to-end time for the job.
    pub total_duration_ms: u64,
    /// Prompt tokens reported by the provider.
    pub prompt_tokens: u32,
    /// Completion tokens reported by the provider.
    pub completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_serialises_round_trip() {
        let out = ExtractionOutput {
            data: json!({"load_details": {"broker_name": "Acme"}}),
            ocr_text: "Broker: Acme".into(),
            stats: ExtractionStats {
                page_count: 1,
                ..Default::default()
            },
        };
        let s = serde_json::to_string(&out).unwrap();
        let back: ExtractionOutput = serde_json::from_str(&s).unwrap();
        assert_eq!(back.data["load_details"]["broker_name"], "Acme");
        assert_eq!(back.stats.page_count, 1);
    }
}
