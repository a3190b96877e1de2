use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::DoodleError;

/// Fixed well-known location of the bundled model
pub const DEFAULT_MODEL_PATH: &str = "model/model.onnx";

#[derive(Debug, thiserror::Error)]
pub enum ModelManagerError {
    #[error("Model file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("HTTP status {status} while fetching {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

impl From<ModelManagerError> for DoodleError {
    fn from(err: ModelManagerError) -> Self {
        DoodleError::ModelError(err.to_string())
    }
}

/// Where the model artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSource {
    /// A model file already on disk
    Path { path: PathBuf },
    /// A model fetched once into the cache under `name`, optionally pinned by SHA-256
    Url {
        name: String,
        url: String,
        #[serde(default)]
        sha256: Option<String>,
    },
}

impl Default for ModelSource {
    fn default() -> Self {
        ModelSource::Path {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { path } => write!(f, "{}", path.display()),
            Self::Url { name, url, .. } => write!(f, "{} ({})", url, name),
        }
    }
}

/// Resolves model sources to local files, downloading into a cache when needed.
#[derive(Debug, Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("DOODLE_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("doodle").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("doodle").join("models");
        }

        env::temp_dir().join("doodle").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, name: &str) -> PathBuf {
        self.models_dir.join(name).join("model.onnx")
    }

    pub fn is_model_downloaded(&self, name: &str) -> bool {
        let model_path = self.get_model_path(name);
        log::debug!("Model path: {:?} (exists: {})", model_path, model_path.exists());
        model_path.exists()
    }

    /// Returns a local path for `source`, fetching it first if it is a URL
    /// that is missing from the cache or fails verification.
    pub async fn resolve(&self, source: &ModelSource) -> Result<PathBuf, ModelManagerError> {
        match source {
            ModelSource::Path { path } => {
                if path.exists() {
                    Ok(path.clone())
                } else {
                    Err(ModelManagerError::NotFound(path.clone()))
                }
            }
            ModelSource::Url { name, url, sha256 } => {
                let path = self.get_model_path(name);
                if path.exists() {
                    match sha256 {
                        Some(expected) if !self.verify_file(&path, expected)? => {
                            log::warn!(
                                "Cached model {:?} failed verification, downloading again",
                                path
                            );
                        }
                        _ => return Ok(path),
                    }
                }
                self.download_model(name, url, sha256.as_deref()).await
            }
        }
    }

    pub async fn download_model(
        &self,
        name: &str,
        url: &str,
        expected_hash: Option<&str>,
    ) -> Result<PathBuf, ModelManagerError> {
        let _lock = self.download_lock.lock().await;
        let path = self.get_model_path(name);

        match self.download_and_verify_file(url, &path, expected_hash).await {
            Ok(()) => {
                log::info!("Model '{}' ready at {:?}", name, path);
                Ok(path)
            }
            Err(e) => {
                log::error!("Failed to fetch model '{}': {}", name, e);
                let _ = self.remove_download(name);
                Err(e)
            }
        }
    }

    /// Compares the SHA-256 of `path` against `expected_hash` (lowercase hex)
    pub fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ModelManagerError> {
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::debug!("Verifying {:?}: calculated {}, expected {}", path, hash, expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash))
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
    ) -> Result<(), ModelManagerError> {
        log::info!("Downloading model from {} to {:?}", url, path);
        let response = reqwest::get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModelManagerError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let actual = sha256_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ModelManagerError::HashMismatch {
                    file: url.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        if let Some(expected) = expected_hash {
            if !self.verify_file(path, expected)? {
                return Err(ModelManagerError::VerificationFailed);
            }
        }
        Ok(())
    }

    pub fn remove_download(&self, name: &str) -> Result<(), ModelManagerError> {
        let model_path = self.get_model_path(name);
        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        Ok(())
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models_dir() {
        env::set_var("DOODLE_CACHE", "/tmp/doodle-test-cache");
        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("/tmp/doodle-test-cache/models"));
        env::remove_var("DOODLE_CACHE");

        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("doodle"));
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_source_display() {
        let source = ModelSource::default();
        assert_eq!(source.to_string(), "model/model.onnx");
    }
}
