use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("PubMed request failed after {attempts} attempt(s){}: {reason}", status_suffix(.status))]
    Retrieval {
        attempts: u32,
        status: Option<u16>,
        reason: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl Error {
    pub fn retrieval(attempts: u32, status: Option<u16>, reason: impl Into<String>) -> Self {
        Error::Retrieval {
            attempts,
            status,
            reason: reason.into(),
        }
    }

    /// Status code of the last failed request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Retrieval { status, .. } => *status,
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_message_includes_status() {
        let err = Error::retrieval(3, Some(503), "Service Unavailable");
        assert_eq!(
            err.to_string(),
            "PubMed request failed after 3 attempt(s) (HTTP 503): Service Unavailable"
        );
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_retrieval_message_without_status() {
        let err = Error::retrieval(1, None, "connection refused");
        assert_eq!(
            err.to_string(),
            "PubMed request failed after 1 attempt(s): connection refused"
        );
    }
}
