//! Asset sources: where the compiled module's bytes come from.
//!
//! The module lives at a theme-relative path (by default
//! `assets/js/dist/sinople_utils.wasm`). Sources resolve that path against a
//! theme root on disk or a configured base URL; no host is baked in.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::error::LoaderError;

/// Default theme-relative location of the compiled utilities module.
pub const DEFAULT_MODULE_PATH: &str = "assets/js/dist/sinople_utils.wasm";

/// Fetches theme assets by theme-relative path.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoaderError>;

    /// Human-readable location, for logs.
    fn describe(&self, path: &str) -> String;
}

/// Reject anything that is not a plain theme-relative path.
pub fn validate_asset_path(path: &str) -> Result<(), LoaderError> {
    let invalid = |reason: &str| LoaderError::InvalidAssetPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.trim().is_empty() {
        return Err(invalid("empty"));
    }
    if path.contains("://") || path.starts_with("//") {
        return Err(invalid("must not name a host"));
    }
    if path.starts_with('/') || path.starts_with('\\') || Path::new(path).is_absolute() {
        return Err(invalid("must be theme-relative"));
    }
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(invalid("must not leave the theme directory"));
    }
    Ok(())
}

/// Reads assets from a theme directory on disk.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches("./"))
    }
}

#[async_trait]
impl AssetSource for FsAssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoaderError> {
        validate_asset_path(path)?;
        let full = self.resolve(path);
        tokio::fs::read(&full)
            .await
            .map_err(|e| LoaderError::Fetch(format!("{}: {e}", full.display())))
    }

    fn describe(&self, path: &str) -> String {
        self.resolve(path).display().to_string()
    }
}

/// Fetches assets over HTTP relative to the theme's public base URL.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssetSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches("./")
        )
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, LoaderError> {
        validate_asset_path(path)?;
        let url = self.url_for(path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoaderError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Fetch(format!("{url}: HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoaderError::Fetch(format!("{url}: {e}")))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self, path: &str) -> String {
        self.url_for(path)
    }
}
