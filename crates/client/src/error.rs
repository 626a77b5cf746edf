use thiserror::Error;

/// Failure talking to the backend.
///
/// None of these are retried: `401`/`403` are policy decisions, the rest are
/// reported to the user as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not authenticated")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Map a non-success status and its body to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden(message),
            404 => Self::NotFound,
            _ => Self::Api { status, message },
        }
    }

    /// `401` or `403`.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Network(_) | Self::Parse(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// The backend reports errors as `{"message": ...}` or `{"errors": ...}`;
/// anything else is passed through as text.
fn extract_message(body: &str) -> String {
    let body = body.trim();
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "errors", "error"] {
            match map.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(serde_json::Value::Null) | None => continue,
                Some(other) => return other.to_string(),
            }
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_statuses() {
        assert_eq!(ApiError::from_status(401, ""), ApiError::Unauthorized);
        assert_eq!(ApiError::from_status(404, "{}"), ApiError::NotFound);
        assert_eq!(
            ApiError::from_status(403, r#"{"message": "Access denied"}"#),
            ApiError::Forbidden("Access denied".to_string())
        );
        assert_eq!(
            ApiError::from_status(500, "boom"),
            ApiError::Api { status: 500, message: "boom".to_string() }
        );
    }

    #[test]
    fn structured_errors_are_stringified() {
        let err = ApiError::from_status(400, r#"{"errors": {"title": "Title is required"}}"#);
        let ApiError::Api { status, message } = err else {
            panic!("expected Api error");
        };
        assert_eq!(status, 400);
        assert!(message.contains("Title is required"));
    }

    #[test]
    fn auth_failures() {
        assert!(ApiError::Unauthorized.is_auth_failure());
        assert!(ApiError::Forbidden(String::new()).is_auth_failure());
        assert!(!ApiError::NotFound.is_auth_failure());
        assert_eq!(ApiError::Network("x".into()).status(), None);
    }
}
