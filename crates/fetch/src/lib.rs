//! GitHub download collaborator for skillbridge.
//!
//! Given a `github.com/<owner>/<repo>/tree/<branch>/<path>` URL, finds every
//! skill directory at or below the path and copies it into
//! `<output>/<owner>/<skill>`. Downloads are cooperative: a [`StopFlag`]
//! shared with the caller ends the run between requests.

pub mod downloader;
pub mod record;
pub mod stop;

pub use downloader::{DownloadEvent, DownloadReport, GitHubDownloader};
pub use record::{merge_recorded_urls, record_address, ADDRESS_FILE};
pub use stop::StopFlag;
