//! Location and download of the ocrs recognition models.
//!
//! The engine needs two rten model files — one detection architecture, one
//! recognition architecture. They are searched for in an explicit directory
//! first, then standard data directories, and downloaded with curl/wget on
//! first use (~12 MB total) when absent everywhere.

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

const DETECTION_FILE: &str = "text-detection.rten";
const RECOGNITION_FILE: &str = "text-recognition.rten";

const DETECTION_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Resolved paths to the two model files the engine loads at startup.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub detection: PathBuf,
    pub recognition: PathBuf,
}

impl ModelFiles {
    /// Find the model files, downloading them into the default data
    /// directory if no candidate location has them.
    ///
    /// Search order: `explicit_dir` (from config), `RATECON_MODEL_DIR`,
    /// then the platform data directory and `./models/ocrs`.
    pub fn locate(explicit_dir: Option<&Path>) -> Result<Self, ExtractError> {
        if let Some(dir) = explicit_dir {
            if Self::present_in(dir) {
                return Ok(Self::in_dir(dir));
            }
            return Err(ExtractError::OcrModelsUnavailable {
                detail: format!("no model files in configured directory {:?}", dir),
            });
        }

        for dir in Self::candidate_dirs() {
            if Self::present_in(&dir) {
                return Ok(Self::in_dir(&dir));
            }
        }

        let target = Self::default_dir();
        std::fs::create_dir_all(&target).map_err(|e| ExtractError::OcrModelsUnavailable {
            detail: format!("cannot create {:?}: {e}", target),
        })?;

        info!("Downloading OCR models (~12 MB) to {:?}", target);
        download(DETECTION_URL, &target.join(DETECTION_FILE))?;
        download(RECOGNITION_URL, &target.join(RECOGNITION_FILE))?;

        Ok(Self::in_dir(&target))
    }

    fn in_dir(dir: &Path) -> Self {
        Self {
            detection: dir.join(DETECTION_FILE),
            recognition: dir.join(RECOGNITION_FILE),
        }
    }

    /// Whether a directory holds both required model files.
    pub fn present_in(dir: &Path) -> bool {
        dir.join(DETECTION_FILE).exists() && dir.join(RECOGNITION_FILE).exists()
    }

    /// Standard directories searched before falling back to a download.
    fn candidate_dirs() -> Vec<PathBuf> {
        let mut dirs_list = Vec::new();
        if let Ok(env_dir) = std::env::var("RATECON_MODEL_DIR") {
            if !env_dir.is_empty() {
                dirs_list.push(PathBuf::from(env_dir));
            }
        }
        dirs_list.push(Self::default_dir());
        if let Some(home) = dirs::home_dir() {
            dirs_list.push(home.join(".ratecon").join("models"));
        }
        dirs_list.push(PathBuf::from("./models/ocrs"));
        dirs_list
    }

    /// Platform data directory used for downloads.
    fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("ratecon")
            .join("models")
    }
}

/// Download a file with curl, falling back to wget.
fn download(url: &str, dest: &Path) -> Result<(), ExtractError> {
    if dest.exists() {
        return Ok(());
    }

    let status = Command::new("curl")
        .args(["-fsSL", "-o"])
        .arg(dest)
        .arg(url)
        .status();

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => {
            let _ = std::fs::remove_file(dest);
            Err(ExtractError::OcrModelsUnavailable {
                detail: format!("download failed for {url}"),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let status = Command::new("wget")
                .args(["-q", "-O"])
                .arg(dest)
                .arg(url)
                .status();
            match status {
                Ok(s) if s.success() => Ok(()),
                Ok(_) => {
                    let _ = std::fs::remove_file(dest);
                    Err(ExtractError::OcrModelsUnavailable {
                        detail: format!("download failed for {url}"),
                    })
                }
                Err(_) => Err(ExtractError::OcrModelsUnavailable {
                    detail: "neither curl nor wget is installed".into(),
                }),
            }
        }
        Err(e) => Err(ExtractError::OcrModelsUnavailable {
            detail: format!("curl failed to start: {e}"),
        }),
    }
}
