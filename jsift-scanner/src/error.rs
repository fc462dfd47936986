use thiserror::Error;

/// Failure to retrieve one remote resource.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Relay error for {url}: {reason}")]
    Relay { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Could not resolve '{reference}': {source}")]
    Resolution {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch seed page: {0}")]
    SeedFetch(#[source] FetchError),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Scan cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ScanError>;
