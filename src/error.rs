use serde_json::Value;
use thiserror::Error;

/// Main error type for Cora API operations
#[derive(Debug, Error)]
pub enum CoraError {
    /// A configuration value was present but not acceptable
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A required configuration value was not provided
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    /// The request never produced a classifiable server response
    /// (connection, TLS or decoding failure)
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server processed the request and rejected it
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        body: Option<Value>,
    },

    /// Rendering a Pix QR code failed
    #[error("QR code error: {0}")]
    QrCode(String),
}

impl CoraError {
    /// Create a new API error for the given status and decoded body
    pub fn api(status: u16, body: Option<Value>) -> Self {
        CoraError::Api {
            message: format!("Cora API error ({})", status),
            status,
            body,
        }
    }

    /// Create a new transport error
    pub fn transport(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        CoraError::Transport {
            message: message.into(),
            source,
        }
    }

    /// Check if this error is a permission denied error (403)
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CoraError::Api { status: 403, .. })
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoraError::Api { status: 404, .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, CoraError::Transport { .. })
    }

    /// Get the HTTP status code if this is an API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CoraError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the decoded error body returned by the API, if any
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            CoraError::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CoraError {
    fn from(err: reqwest::Error) -> Self {
        CoraError::transport(err.to_string(), Some(Box::new(err)))
    }
}

impl From<serde_json::Error> for CoraError {
    fn from(err: serde_json::Error) -> Self {
        CoraError::transport(format!("failed to decode JSON: {}", err), Some(Box::new(err)))
    }
}

/// Result type for Cora operations
pub type Result<T> = std::result::Result<T, CoraError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_permission_denied() {
        let error = CoraError::api(403, Some(json!({"message": "forbidden"})));
        assert!(error.is_permission_denied());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_error_not_found() {
        let error = CoraError::api(404, None);
        assert!(error.is_not_found());
        assert_eq!(error.status_code(), Some(404));
        assert!(error.response_body().is_none());
    }

    #[test]
    fn test_transport_has_no_status() {
        let error = CoraError::transport("connection refused", None);
        assert!(error.is_transport());
        assert_eq!(error.status_code(), None);
        assert_eq!(error.to_string(), "transport error: connection refused");
    }

    #[test]
    fn test_json_error_is_transport() {
        let err = serde_json::from_str::<Value>("{not json").unwrap_err();
        let error: CoraError = err.into();
        assert!(error.is_transport());
    }
}
