use std::{path::PathBuf, time::Duration};

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned {status}: {message}")]
    Service {
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to obtain session token: {source}")]
    Credentials { source: anyhow::Error },
    #[error("unsupported resume file '{0}': only PDF and DOCX files are allowed")]
    UnsupportedFile(String),
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Service { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Service {
                code: ErrorCode::Unauthorized | ErrorCode::Forbidden,
                ..
            } | ClientError::Credentials { .. }
        )
    }
}

impl From<ApiError> for ClientError {
    fn from(value: ApiError) -> Self {
        ClientError::Service {
            status: value.status,
            code: value.code,
            message: value.message,
        }
    }
}

/// Why a simulated analysis run ended without a result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("analysis failed: {0}")]
    Remote(#[from] ClientError),
    #[error("analysis timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}
