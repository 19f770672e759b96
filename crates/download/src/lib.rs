//! Download-with-loader flow: fetch a file while the indicator is up, save it
//! under the server-provided name, and fall back to a plain navigation when
//! anything goes wrong.

pub mod disposition;
pub mod error;
pub mod flow;

pub use disposition::{filename_from_disposition, sanitize_filename, FALLBACK_FILENAME};
pub use error::DownloadError;
pub use flow::{
    DirectorySink, DownloadFlow, DownloadOutcome, FetchedFile, Fetcher, FileSink, HttpFetcher,
    Navigator,
};
