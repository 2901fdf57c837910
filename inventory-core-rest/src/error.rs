use thiserror::Error;

/// Failures of the REST backend layer.
///
/// Repository methods box these into `Box<dyn Error + Send + Sync>`; the
/// tracking core only ever looks at the message.
#[derive(Debug, Error)]
pub enum RestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid REST config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid REST config: {0}")]
    Config(String),
}

impl RestError {
    /// HTTP status of a rejected request, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Status { status, .. } => Some(*status),
            RestError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
