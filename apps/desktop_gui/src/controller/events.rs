//! Events flowing from the backend worker to the UI thread.

use download::DownloadOutcome;
use shared::domain::ShowRequest;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderRequest {
    Show(ShowRequest),
    Hide,
}

#[derive(Debug)]
pub enum UiEvent {
    Loader(LoaderRequest),
    /// A failed download fell back to opening the resource directly.
    Navigated(Url),
    DownloadFinished(DownloadOutcome),
    Error(String),
}
