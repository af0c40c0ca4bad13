//! Error types shared by the collect and verify stages

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// The source list exists but has no usable entries
    #[error("{} contains no source URLs, add one URL per line", .path.display())]
    EmptyInput { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl HarvestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarvestError::Io {
            path: path.into(),
            source,
        }
    }
}
