//! Raw directory content sources
//!
//! A content source supplies the raw directory JSON text. Two sources exist:
//! an operator-supplied local override file and the remote repository file
//! that is the source of truth. The loader tries them in that order; exactly
//! one source wins per load, never a partial merge.

use async_trait::async_trait;
use guilddir_common::config::RemoteConfig;
use guilddir_common::{Error, Result, SourceLabel};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Base URL for raw repository content
const RAW_CONTENT_URL: &str = "https://raw.githubusercontent.com";

/// One candidate source of raw directory text
#[async_trait]
pub trait RawSource: Send + Sync {
    /// Provenance label reported alongside a snapshot loaded from here
    fn label(&self) -> SourceLabel;

    /// Fetch the raw text. An ordinary missing-file / missing-path case
    /// fails with [`Error::NotFound`] so the loader can fall back; any
    /// other failure is surfaced as-is.
    async fn fetch(&self) -> Result<String>;
}

/// Operator-supplied override file on local disk
pub struct LocalOverrideSource {
    path: PathBuf,
}

impl LocalOverrideSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl RawSource for LocalOverrideSource {
    fn label(&self) -> SourceLabel {
        SourceLabel::LocalOverride
    }

    async fn fetch(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                debug!(path = %self.path.display(), "read local override");
                Ok(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(self.path.display().to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Remote content source: a repository-relative file fetched over HTTP
pub struct RemoteContentSource {
    http: Client,
    url: String,
}

impl RemoteContentSource {
    pub fn new(cfg: &RemoteConfig, timeout: Duration) -> Self {
        let url = format!(
            "{}/{}/{}/{}/{}",
            RAW_CONTENT_URL, cfg.owner, cfg.repo, cfg.branch, cfg.path
        );
        Self {
            http: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            url,
        }
    }
}

#[async_trait]
impl RawSource for RemoteContentSource {
    fn label(&self) -> SourceLabel {
        SourceLabel::Remote
    }

    async fn fetch(&self) -> Result<String> {
        let response = self.http.get(&self.url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(self.url.clone()));
        }
        let response = response.error_for_status()?;
        debug!(url = %self.url, "fetched remote directory content");
        Ok(response.text().await?)
    }
}
