//! Errors returned by the Supabase HTTP APIs

/// A request reached the backend but did not succeed
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Non-2xx response
    Status {
        method: &'static str,
        /// Request path, without the base URL
        path: String,
        status: u16,
        /// Error message from the response body, or the raw body
        message: String,
    },
    /// Response body did not have the expected shape
    UnexpectedResponse { path: String, message: String },
}

#[cfg(test)]
impl ApiError {
    /// HTTP status code, if the error came from a response status
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::UnexpectedResponse { .. } => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Status {
                method,
                path,
                status,
                message,
            } => write!(f, "{} {} failed with HTTP {}: {}", method, path, status, message),
            ApiError::UnexpectedResponse { path, message } => {
                write!(f, "Unexpected response from {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Pull a readable message out of a Supabase error body.
///
/// GoTrue uses `msg`/`error_description`, PostgREST uses `message`, Storage
/// uses `message`/`error`. Falls back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}
