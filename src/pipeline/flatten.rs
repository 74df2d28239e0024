//! Flattening: reduce the OCR hierarchy to plain text for the prompt.
//!
//! For each page in document order, for each block in page order, for each
//! line in block order: join that line's word tokens with single spaces, then
//! join all line strings with newlines. No reordering, no deduplication, no
//! filtering. The traversal order defines the output order exactly — it is
//! what lets the model associate a label with the adjacent value, so any
//! "cleanup" here would cost extraction accuracy downstream.

use crate::ocr::OcrDocument;

/// Flatten an OCR result to one newline-joined string.
pub fn flatten_document(doc: &OcrDocument) -> String {
    let mut lines: Vec<String> = Vec::new();
    for page in &doc.pages {
        for block in &page.blocks {
            for line in &block.lines {
                let words: Vec<&str> = line.words.iter().map(|w| w.text.as_str()).collect();
                lines.push(words.join(" "));
            }
        }
    }
    lines.join("\n")
}
