//! CLI binary for ratecon-extract.
//!
//! A thin shim over the library crate: encodes the input PDF, runs the job
//! handler, and prints the response envelope.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use ratecon_extract::pipeline::{decode, flatten};
use ratecon_extract::{Extractor, ExtractorConfig, JobRequest};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a rate confirmation (envelope JSON on stdout)
  ratecon confirmation.pdf

  # Bare extraction data only
  ratecon --data-only confirmation.pdf > fields.json

  # Process a raw job payload exactly as the serverless runtime would
  ratecon --job payload.json
  cat payload.json | ratecon --job -

  # OCR preview without an API key
  ratecon --text-only confirmation.pdf

  # Use a specific model
  ratecon --model gpt-4o --provider openai confirmation.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  RATECON_LLM_PROVIDER    Override provider (openai, anthropic, gemini, ollama)
  RATECON_MODEL           Override model ID
  RATECON_MODEL_DIR       Directory holding the OCR .rten model files

SETUP:
  1. Set API key:   export OPENAI_API_KEY=sk-...
  2. Extract:       ratecon confirmation.pdf

  The OCR models (~12 MB) are downloaded automatically on first run.
"#;

/// Extract structured load-confirmation data from a rate-confirmation PDF.
#[derive(Parser, Debug)]
#[command(
    name = "ratecon",
    version,
    about = "Extract structured load-confirmation data from rate-confirmation PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file path, or a job-payload JSON file with --job ("-" for stdin).
    input: String,

    /// Treat INPUT as a raw `{"input": {"base64_pdf": …}}` job payload.
    #[arg(long)]
    job: bool,

    /// Write the response JSON to this file instead of stdout.
    #[arg(short, long, env = "RATECON_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4o).
    #[arg(long, env = "RATECON_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "RATECON_LLM_PROVIDER")]
    provider: Option<String>,

    /// Rendering DPI for OCR (72–600).
    #[arg(long, env = "RATECON_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Max LLM output tokens.
    #[arg(long, env = "RATECON_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Directory holding text-detection.rten / text-recognition.rten.
    #[arg(long, env = "RATECON_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "RATECON_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Print only the extracted data object, not the envelope.
    #[arg(long)]
    data_only: bool,

    /// Stop after OCR and print the flattened text (no API key needed).
    #[arg(long)]
    text_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RATECON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "RATECON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve the job payload ──────────────────────────────────────────
    let raw_job: Option<String> = if cli.job {
        Some(if cli.input == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read job payload from stdin")?;
            buf
        } else {
            std::fs::read_to_string(&cli.input)
                .with_context(|| format!("Failed to read job payload '{}'", cli.input))?
        })
    } else {
        None
    };

    let base64_pdf: Option<String> = if cli.job {
        None
    } else {
        let bytes = std::fs::read(&cli.input)
            .with_context(|| format!("Failed to read PDF '{}'", cli.input))?;
        Some(STANDARD.encode(&bytes))
    };

    // ── Text-only mode: decode + OCR + flatten, no provider needed ───────
    if cli.text_only {
        let payload = base64_pdf
            .as_deref()
            .context("--text-only expects a PDF path, not --job")?;
        let pdf_bytes = decode::decode_pdf_payload(payload)?;

        let engine = ratecon_extract::ocr::OcrsEngine::new(
            cli.model_dir.as_deref(),
            cli.dpi,
            2500,
        )?;
        let document = tokio::task::spawn_blocking(move || {
            use ratecon_extract::ocr::DocumentOcr as _;
            engine.extract(&pdf_bytes)
        })
        .await
        .context("OCR task panicked")??;

        println!("{}", flatten::flatten_document(&document));
        return Ok(());
    }

    // ── Build config and pipeline ────────────────────────────────────────
    let config = build_config(&cli).await?;
    let extractor = Extractor::new(config).context("Failed to initialise pipeline")?;

    // ── Run the job ──────────────────────────────────────────────────────
    let start = Instant::now();
    let response = match (raw_job, base64_pdf) {
        (Some(raw), _) => extractor.handle_json(&raw).await,
        (None, Some(b64)) => extractor.handle(&JobRequest::from_base64(b64)).await,
        (None, None) => unreachable!("one of --job or a PDF path is always set"),
    };
    let elapsed_ms = start.elapsed().as_millis();

    // ── Print result ─────────────────────────────────────────────────────
    let printable = if cli.data_only {
        serde_json::to_string_pretty(&response.data)
    } else {
        serde_json::to_string_pretty(&response)
    }
    .context("Failed to serialise response")?;

    if let Some(ref path) = cli.output {
        std::fs::write(path, &printable)
            .with_context(|| format!("Failed to write output file {:?}", path))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(printable.as_bytes())?;
        handle.write_all(b"\n").ok();
    }

    if !cli.quiet {
        if response.success {
            eprintln!("{} extracted in {}", green("✔"), dim(&format!("{elapsed_ms}ms")));
        } else {
            eprintln!(
                "{} job failed: {}",
                red("✘"),
                response.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    // A failed job is a failed exit code for scripting.
    if !response.success {
        std::process::exit(1);
    }

    Ok(())
}

/// Map CLI args to `ExtractorConfig`.
async fn build_config(cli: &Cli) -> Result<ExtractorConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = ExtractorConfig::builder()
        .dpi(cli.dpi)
        .max_tokens(cli.max_tokens);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref dir) = cli.model_dir {
        builder = builder.model_dir(dir.clone());
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}
