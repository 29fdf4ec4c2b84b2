use thiserror::Error;

/// Failures talking to the persistence API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-side rejections, as opposed to transport or decoding problems.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if (400..500).contains(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        let rejected = ApiError::Status {
            status: 422,
            message: "bad payload".into(),
        };
        let unavailable = ApiError::Status {
            status: 503,
            message: "down".into(),
        };
        assert!(rejected.is_rejection());
        assert!(!unavailable.is_rejection());
        assert!(!ApiError::Http("refused".into()).is_rejection());
        assert!(rejected.to_string().contains("422"));
    }
}
