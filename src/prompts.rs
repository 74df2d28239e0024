//! Prompts for LLM-based load-confirmation extraction.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the schema the model is asked to fill is
//!    defined in exactly one place.
//! 2. **Testability** — unit tests can inspect the prompts directly without a
//!    live model, so schema regressions are caught cheaply.
//!
//! Callers can override the system prompt via
//! [`crate::config::ExtractorConfig::system_prompt`]; the constants here are
//! used when no override is provided.

/// Default system prompt: frames the model as a load-confirmation analyst.
pub const SYSTEM_PROMPT: &str = "You are an expert load confirmation analyst \
with extensive experience in the trucking and logistics industry. Your task \
is to extract critical information from load confirmation documents with \
perfect accuracy. Focus on identifying all key data points that carriers \
need for successful load execution and proper payment.";

/// The example output schema sent with every request.
///
/// Every field is an empty placeholder on purpose: the user prompt instructs
/// the model to leave absent fields as empty strings rather than guessing,
/// and an already-empty example reinforces that.
pub const EXAMPLE_SCHEMA: &str = r#"{
  "load_details": {
    "broker_name": "",
    "broker_mc_number": "",
    "load_confirmation_number": "",
    "order_number": "",
    "bol_number": "",
    "reference_numbers": [],
    "commodity": "",
    "weight": "",
    "piece_count": "",
    "temperature_requirements": "",
    "equipment_type": "",
    "total_miles": ""
  },
  "financial": {
    "base_rate": "",
    "total_carrier_pay": "",
    "accessorial_charges": {},
    "detention_rate": "",
    "detention_terms": "",
    "payment_terms": ""
  },
  "pickup": {
    "facility_name": "",
    "address": "",
    "city": "",
    "state": "",
    "zip": "",
    "date": "",
    "time_window": "",
    "contact_information": "",
    "reference_numbers": [],
    "special_instructions": ""
  },
  "delivery": {
    "facility_name": "",
    "address": "",
    "city": "",
    "state": "",
    "zip": "",
    "date": "",
    "time_window": "",
    "contact_information": "",
    "reference_numbers": [],
    "special_instructions": ""
  },
  "driver_equipment": {
    "driver_name": "",
    "driver_phone": "",
    "tractor_number": "",
    "trailer_number": "",
    "tractor_vin": ""
  },
  "operational_requirements": {
    "tracking_requirements": "",
    "communication_protocols": "",
    "loading_responsibility": "",
    "unloading_responsibility": ""
  },
  "penalties_restrictions": {
    "cancellation_fee": "",
    "rescheduling_fee": "",
    "late_delivery_penalty": "",
    "weekend_holiday_restrictions": ""
  }
}"#;

/// Build the user prompt for a document's OCR text.
///
/// The instruction explicitly forbids fabricating values: fields absent from
/// the source document come back as empty strings, not guesses.
pub fn build_user_prompt(ocr_text: &str) -> String {
    format!(
        "Given the raw information extracted using OCR from a load \
confirmation document, you should extract the most important parts such as \
rate information, pickup/delivery details, BOL numbers, reference numbers, \
and all other critical elements.\n\n\
OCR Result:\n{ocr_text}\n\n\
Please provide the extracted information in JSON format.\n\n\
Example JSON output:\n{EXAMPLE_SCHEMA}\n\n\
Extracted Information JSON: Warning: Extract only information that is \
actually present in the document. Don't make up fake information. If certain \
fields are not present, leave them as empty strings."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_schema_is_valid_json() {
        let v: serde_json::Value = serde_json::from_str(EXAMPLE_SCHEMA).unwrap();
        assert!(v.get("load_details").is_some());
        assert!(v.get("financial").is_some());
        assert_eq!(v["load_details"]["broker_name"], "");
    }

    #[test]
    fn user_prompt_embeds_text_and_schema() {
        let p = build_user_prompt("BROKER: Acme Logistics\nRATE: $1,850.00");
        assert!(p.contains("Acme Logistics"));
        assert!(p.contains("\"broker_name\": \"\""));
        assert!(p.contains("leave them as empty strings"));
    }

    #[test]
    fn system_prompt_sets_the_analyst_role() {
        assert!(SYSTEM_PROMPT.contains("load confirmation analyst"));
    }
}
