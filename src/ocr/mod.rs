//! OCR collaborator: PDF bytes in, a recognised-text hierarchy out.
//!
//! The pipeline never talks to an OCR library directly. It depends on the
//! [`DocumentOcr`] trait, and the hierarchy types below are the contract:
//! pages → blocks → lines → words, in document order, each word carrying one
//! recognised token. Geometry and confidence are deliberately absent — the
//! downstream flattener discards them anyway.
//!
//! The built-in implementation is [`OcrsEngine`]: pdfium rasterisation plus
//! the pure-Rust `ocrs` recogniser (rten detection + recognition models).
//! Tests substitute their own `DocumentOcr` and never touch pdfium.

mod engine;
mod models;
mod render;

pub use engine::OcrsEngine;
pub use models::ModelFiles;

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};

/// A full OCR result for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrDocument {
    pub pages: Vec<OcrPage>,
}

/// One page of recognised text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    pub blocks: Vec<OcrBlock>,
}

/// A block of lines. Engines without block segmentation emit one block per page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrBlock {
    pub lines: Vec<OcrLine>,
}

/// One visual line of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub words: Vec<OcrWord>,
}

/// A single recognised token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
}

impl OcrDocument {
    /// Total recognised words across all pages.
    pub fn word_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.blocks)
            .flat_map(|b| &b.lines)
            .map(|l| l.words.len())
            .sum()
    }
}

impl OcrLine {
    /// Build a line from whitespace-separated tokens.
    pub fn from_text(text: &str) -> Self {
        Self {
            words: text
                .split_whitespace()
                .map(|w| OcrWord { text: w.to_string() })
                .collect(),
        }
    }
}

/// The OCR collaborator interface.
///
/// Implementations are long-lived, constructed once at process start, and
/// shared read-only across jobs. `extract` is synchronous and CPU-bound; the
/// orchestrator runs it under `spawn_blocking`.
pub trait DocumentOcr: Send + Sync {
    /// Recognise all text in a PDF, preserving document order.
    fn extract(&self, pdf_bytes: &[u8]) -> Result<OcrDocument, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_from_text_tokenises_on_whitespace() {
        let line = OcrLine::from_text("  Acme   Logistics LLC ");
        let tokens: Vec<&str> = line.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(tokens, vec!["Acme", "Logistics", "LLC"]);
    }

    #[test]
    fn word_count_walks_the_whole_hierarchy() {
        let doc = OcrDocument {
            pages: vec![
                OcrPage {
                    blocks: vec![OcrBlock {
                        lines: vec![OcrLine::from_text("a b"), OcrLine::from_text("c")],
                    }],
                },
                OcrPage {
                    blocks: vec![OcrBlock {
                        lines: vec![OcrLine::from_text("d e f")],
                    }],
                },
            ],
        };
        assert_eq!(doc.word_count(), 6);
    }
}
