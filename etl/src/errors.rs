use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to fetch data: {status}")]
    Fetch { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed weather response: missing or invalid `{0}`")]
    MalformedResponse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which stage of a run an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    MalformedResponse,
    Persist,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Fetch { .. } | Error::Http(_) => ErrorKind::Fetch,
            Error::MalformedResponse(_) | Error::Json(_) => ErrorKind::MalformedResponse,
            Error::Database(_) => ErrorKind::Persist,
            Error::Config(_) | Error::Io(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_mentions_status() {
        let err = Error::Fetch { status: 503 };
        assert_eq!(err.to_string(), "Failed to fetch data: 503");
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::MalformedResponse("current_weather".to_string()).kind(),
            ErrorKind::MalformedResponse
        );
        assert_eq!(Error::Database(sqlx::Error::PoolClosed).kind(), ErrorKind::Persist);
        assert_eq!(Error::Config("x".to_string()).kind(), ErrorKind::Config);
    }
}
