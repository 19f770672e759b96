use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use loader_core::LoaderControl;
use reqwest::{header::CONTENT_DISPOSITION, Client};
use shared::domain::{ShowRequest, DOWNLOAD_TEXT};
use tracing::{info, warn};
use url::Url;

use crate::{
    disposition::{filename_from_disposition, sanitize_filename, FALLBACK_FILENAME},
    error::DownloadError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub disposition: Option<String>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedFile, DownloadError>;
}

#[async_trait]
pub trait FileSink: Send + Sync {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError>;
}

/// Full-page navigation, used when the in-place download fails.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url);
}

#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedFile, DownloadError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
            });
        }

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?.to_vec();
        Ok(FetchedFile { bytes, disposition })
    }
}

/// Writes downloads into one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DownloadError::Write {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(sanitize_filename(filename));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { path: PathBuf, filename: String },
    /// The download failed and the original URL was navigated to instead.
    FellBack,
}

pub struct DownloadFlow {
    loader: Arc<dyn LoaderControl>,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn FileSink>,
    navigator: Arc<dyn Navigator>,
    text: String,
}

impl DownloadFlow {
    pub fn new(
        loader: Arc<dyn LoaderControl>,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn FileSink>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            loader,
            fetcher,
            sink,
            navigator,
            text: DOWNLOAD_TEXT.into(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Never fails: errors end in a fallback navigation. The indicator is
    /// hidden on every exit path.
    pub async fn run(&self, url: &Url) -> DownloadOutcome {
        self.loader.show(ShowRequest::new(self.text.clone()));
        let _hide = HideOnDrop(self.loader.as_ref());

        match self.fetch_and_save(url).await {
            Ok((path, filename)) => {
                info!(%url, path = %path.display(), "download saved");
                DownloadOutcome::Saved { path, filename }
            }
            Err(error) => {
                warn!(%url, %error, "download failed; navigating to resource instead");
                self.navigator.navigate(url);
                DownloadOutcome::FellBack
            }
        }
    }

    async fn fetch_and_save(&self, url: &Url) -> Result<(PathBuf, String), DownloadError> {
        let fetched = self.fetcher.fetch(url).await?;
        let filename = filename_from_disposition(fetched.disposition.as_deref())
            .unwrap_or_else(|| FALLBACK_FILENAME.to_owned());
        let path = self.sink.save(&filename, &fetched.bytes).await?;
        Ok((path, filename))
    }
}

struct HideOnDrop<'a>(&'a dyn LoaderControl);

impl Drop for HideOnDrop<'_> {
    fn drop(&mut self) {
        self.0.hide();
    }
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
