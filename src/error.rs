use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the textbook backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with an error status.
    #[error("server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Server {
        status: StatusCode,
        detail: Option<String>,
    },

    /// The server answered 2xx but the body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl BackendError {
    /// Message to show a user: server detail first, then the transport
    /// message, then `generic`.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            BackendError::Server {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            BackendError::Transport(msg) | BackendError::Decode(msg) if !msg.trim().is_empty() => {
                msg.clone()
            }
            BackendError::Server { status, .. } => {
                format!("Request failed with status code {}", status.as_u16())
            }
            _ => generic.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_detail() {
        let err = BackendError::Server {
            status: StatusCode::UNAUTHORIZED,
            detail: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    }

    #[test]
    fn test_user_message_falls_back_to_status_without_detail() {
        let err = BackendError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        };
        assert_eq!(
            err.user_message("Translation failed"),
            "Request failed with status code 500"
        );
    }

    #[test]
    fn test_user_message_uses_transport_message() {
        let err = BackendError::Transport("connection refused".to_string());
        assert_eq!(err.user_message("Translation failed"), "connection refused");
    }

    #[test]
    fn test_user_message_generic_when_empty() {
        let err = BackendError::Transport("  ".to_string());
        assert_eq!(err.user_message("Translation failed"), "Translation failed");
    }
}
