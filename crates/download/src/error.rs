use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed: {status}")]
    Status { status: u16 },
    #[error("download transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
