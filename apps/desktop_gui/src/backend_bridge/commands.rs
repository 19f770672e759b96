//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use url::Url;

pub enum BackendCommand {
    Download { url: Url, dir: PathBuf },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Download { .. } => "download",
        }
    }
}
