use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response was received at all (DNS, connect, TLS, timeout).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {message}")]
    Server { status: StatusCode, message: String },

    /// A 2xx response whose body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for raw response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape the TechFlow API uses for failures
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    /// Truncate a response body to avoid dragging huge payloads into logs
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = body
                .char_indices()
                .take_while(|(i, _)| *i < MAX_ERROR_BODY_LENGTH)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    /// Build a `Server` error from a non-2xx status and its raw body.
    ///
    /// The API reports failures as `{"message": "..."}`; when the body is
    /// anything else the (truncated) raw text is kept so nothing is lost.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.message.is_empty() => parsed.message,
            _ => {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    Self::truncate_body(trimmed)
                }
            }
        };
        ApiError::Server { status, message }
    }

    /// Status code of a `Server` error, if that is what this is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
