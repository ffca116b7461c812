use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Fetch service is not running")]
    ServiceClosed,
}

impl FetchError {
    /// True for failures where nothing was received at all (offline,
    /// DNS, refused connection), as opposed to a server-side rejection.
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}
