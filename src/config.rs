//! Configuration for the extraction pipeline.
//!
//! All behaviour is controlled through [`ExtractorConfig`], built via its
//! [`ExtractorConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across jobs and to diff two runs when their
//! outputs differ.

use crate::error::ExtractError;
use crate::llm::CompletionClient;
use crate::ocr::DocumentOcr;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a load-confirmation extraction pipeline.
///
/// Built via [`ExtractorConfig::builder()`] or [`ExtractorConfig::default()`].
///
/// # Example
/// ```rust
/// use ratecon_extract::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .model("gpt-4o")
///     .dpi(300)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractorConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    ///
    /// OCR accuracy degrades sharply below 300 DPI on the small print that
    /// load confirmations are full of (MC numbers, reference numbers,
    /// detention terms). 300 is the conventional OCR rendering density.
    pub dpi: u32,

    /// Maximum rendered page dimension (width or height) in pixels. Default: 2500.
    ///
    /// A safety cap independent of DPI so an oversized page cannot exhaust
    /// memory; the other dimension scales proportionally.
    pub max_rendered_pixels: u32,

    /// LLM model identifier, e.g. "gpt-4o". If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `client`, the provider is auto-detected from the
    /// environment at startup.
    pub provider_name: Option<String>,

    /// Pre-constructed completion client. Takes precedence over
    /// `provider_name`. Used by tests and callers that need custom middleware.
    pub client: Option<Arc<dyn CompletionClient>>,

    /// Pre-constructed OCR collaborator. When None, the built-in ocrs engine
    /// is constructed at startup.
    pub ocr: Option<Arc<dyn DocumentOcr>>,

    /// Sampling temperature for the completion. Default: 0.0.
    ///
    /// Zero keeps repeated extractions of the same document reproducible as
    /// far as the hosted model allows. Raising it buys nothing here — field
    /// extraction wants the most literal reading available.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate. Default: 4096.
    ///
    /// The full example schema filled in runs well under 1k tokens; 4096
    /// leaves room for documents with long special-instruction blocks.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses the built-in analyst prompt.
    pub system_prompt: Option<String>,

    /// Directory containing `text-detection.rten` and `text-recognition.rten`.
    /// When None, standard data directories are searched and the models are
    /// downloaded on first use.
    pub model_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            max_rendered_pixels: 2500,
            model: None,
            provider_name: None,
            client: None,
            ocr: None,
            temperature: 0.0,
            max_tokens: 4096,
            system_prompt: None,
            model_dir: None,
        }
    }
}

impl fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("client", &self.client.as_ref().map(|_| "<dyn CompletionClient>"))
            .field("ocr", &self.ocr.as_ref().map(|_| "<dyn DocumentOcr>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("model_dir", &self.model_dir)
            .finish()
    }
}

impl ExtractorConfig {
    /// Create a new builder for `ExtractorConfig`.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractorConfig`].
#[derive(Debug)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn ocr(mut self, ocr: Arc<dyn DocumentOcr>) -> Self {
        self.config.ocr = Some(ocr);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.model_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractorConfig, ExtractError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.max_tokens == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
