use serde_json::Value;
use thiserror::Error;

/// Client-level error type.
/// Only 401s are recovered inside the session manager; everything else reaches the caller as-is.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A 401 that survived the single refresh-and-retry, or arrived with no refresh token.
    /// Keeps the response body so login can show the server's `detail`.
    #[error("Session expired: {body}")]
    AuthExpired { body: Value },

    /// The refresh endpoint rejected the refresh token or could not be reached.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// A 4xx (other than 401) carrying the backend's field-level detail.
    #[error("Validation error (status {status}): {body}")]
    Validation { status: u16, body: Value },

    #[error("Server error (status {status}): {body}")]
    Server { status: u16, body: Value },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session store error: {0}")]
    Store(#[from] std::io::Error),

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Input(String),
}

impl ClientError {
    /// Builds the error for a non-2xx response.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let body = parse_body(body);
        if status == 401 {
            ClientError::AuthExpired { body }
        } else if status >= 500 {
            ClientError::Server { status, body }
        } else {
            ClientError::Validation { status, body }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ClientError::AuthExpired { .. } => "AUTH_EXPIRED",
            ClientError::RefreshFailed(_) => "REFRESH_FAILED",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Server { .. } | ClientError::Http(_) => "NETWORK_OR_SERVER_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Store(_) => "STORE_ERROR",
            ClientError::Input(_) => "INVALID_INPUT",
        }
    }

    /// True when the stored session can no longer authenticate requests.
    pub fn ends_session(&self) -> bool {
        matches!(self, ClientError::AuthExpired { .. } | ClientError::RefreshFailed(_))
    }

    /// The server's `detail` string when present, otherwise `fallback`.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ClientError::AuthExpired { body }
            | ClientError::Validation { body, .. }
            | ClientError::Server { body, .. } => body
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            ClientError::Input(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    /// The full response body serialized as JSON when present, otherwise `fallback`.
    pub fn body_or(&self, fallback: &str) -> String {
        match self {
            ClientError::AuthExpired { body }
            | ClientError::Validation { body, .. }
            | ClientError::Server { body, .. }
                if !body.is_null() =>
            {
                body.to_string()
            }
            ClientError::Input(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Non-JSON bodies (HTML error pages, plain text) are kept as a JSON string.
fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
