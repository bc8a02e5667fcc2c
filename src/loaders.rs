use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PipelineError, Result};

pub(crate) const CONFIG_FILE: &str = "config.json";
pub(crate) const VOCAB_FILE: &str = "vocab.json";
pub(crate) const WEIGHTS_FILE: &str = "model.safetensors";

/// Downloads one file of a parameter bundle from the Hugging Face Hub.
#[derive(Debug, Clone)]
pub(crate) struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let api = hf_hub::api::sync::Api::new()?;
        let repo = api.model(self.repo.clone());

        let max_retries = 3;
        let mut attempts = 0u32;

        for attempt in 0..max_retries {
            match repo.get(self.filename.as_str()) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    let error_msg = e.to_string();
                    attempts = attempt + 1;
                    if error_msg.contains("Lock acquisition failed") && attempt < max_retries - 1 {
                        let wait_time = Duration::from_millis(100 * (1 << attempt));
                        std::thread::sleep(wait_time);
                        continue;
                    }
                    return Err(PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        self.filename, self.repo, error_msg
                    )));
                }
            }
        }

        Err(PipelineError::Download(format!(
            "Download timed out for '{}' from '{}' after {} attempt(s)",
            self.filename, self.repo, attempts
        )))
    }
}

/// Resolved on-disk locations of the three files making up a parameter bundle.
#[derive(Debug, Clone)]
pub(crate) struct BundleFiles {
    pub config: PathBuf,
    pub vocab: PathBuf,
    pub weights: PathBuf,
}

impl BundleFiles {
    /// Resolve a bundle from a local directory, checking that every file exists.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let files = Self {
            config: dir.join(CONFIG_FILE),
            vocab: dir.join(VOCAB_FILE),
            weights: dir.join(WEIGHTS_FILE),
        };
        for path in [&files.config, &files.vocab, &files.weights] {
            if !path.is_file() {
                return Err(PipelineError::ModelLoad(format!(
                    "bundle file '{}' not found in '{}'",
                    path.file_name().and_then(|n| n.to_str()).unwrap_or("?"),
                    dir.display()
                )));
            }
        }
        Ok(files)
    }

    /// Fetch a bundle from a Hugging Face Hub repository.
    pub fn from_hub(repo: &str) -> Result<Self> {
        Ok(Self {
            config: HfLoader::new(repo, CONFIG_FILE).load()?,
            vocab: HfLoader::new(repo, VOCAB_FILE).load()?,
            weights: HfLoader::new(repo, WEIGHTS_FILE).load()?,
        })
    }
}
