//! Client error types for the keyhold SDK

/// Error type for coordination-service client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned error: status={status}, body={body}")]
    ServerError { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::ServerError {
            status: 500,
            body: "internal error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "server returned error: status=500, body=internal error"
        );

        let err = ClientError::InvalidResponse("missing session id".to_string());
        assert_eq!(err.to_string(), "invalid response: missing session id");
    }
}
