use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::errors::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    /// A single-file multipart form. Kept as bytes so a retry can rebuild the form.
    File {
        field: String,
        file_name: String,
        bytes: Bytes,
    },
}

/// Description of an outbound call. Never mutated once dispatched;
/// auth attachment produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post_json<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, ClientError> {
        Ok(Self {
            body: Body::Json(serde_json::to_value(body)?),
            ..Self::new(Method::POST, path)
        })
    }

    pub fn post_file(
        path: impl Into<String>,
        field: &str,
        file_name: &str,
        bytes: Bytes,
    ) -> Self {
        Self {
            body: Body::File {
                field: field.to_string(),
                file_name: file_name.to_string(),
                bytes,
            },
            ..Self::new(Method::POST, path)
        }
    }

    /// Sets `name`, replacing any existing value (names compare case-insensitively).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One pass through dispatch. `retried` flips at most once, after a successful refresh.
#[derive(Debug, Clone)]
pub(crate) struct Attempt {
    pub request: PendingRequest,
    pub retried: bool,
}

impl Attempt {
    pub fn first(request: PendingRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    pub fn into_retry(self) -> Self {
        Self {
            request: self.request,
            retried: true,
        }
    }
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ApiResponse {
    /// Passes 2xx through; anything else becomes the matching error kind.
    pub fn into_result(self) -> Result<Self, ClientError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ClientError::from_status(self.status.as_u16(), &self.body))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
