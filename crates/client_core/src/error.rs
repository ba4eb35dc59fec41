use shared::error::{AdvisorError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("fetch failed for {target}: {source}")]
    Fetch {
        target: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("malformed {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Validation(String),
    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),
}

impl ClientError {
    pub fn fetch(target: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Fetch {
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Fetch { .. } => ErrorCode::Fetch,
            Self::Parse { .. } => ErrorCode::Parse,
            Self::Validation(_) => ErrorCode::Validation,
            Self::Storage(_) => ErrorCode::Storage,
        }
    }
}

impl From<&ClientError> for AdvisorError {
    fn from(value: &ClientError) -> Self {
        AdvisorError::new(value.code(), value.to_string())
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
