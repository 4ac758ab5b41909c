#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Page not found (404): {0}")]
    NotFound(String),
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),
}

impl FetchError {
    /// Failures worth retrying: transport errors and server-side statuses.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(_) => true,
            FetchError::NotFound(_) => false,
            FetchError::Status(code) => *code >= 500 || *code == 429,
        }
    }
}
