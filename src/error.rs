use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for userboard
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    // Record errors
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Malformed identifier. Reported to clients exactly like a missing record.
    #[error("User not found")]
    InvalidId(String),

    // Store errors surface their message verbatim
    #[error("{0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Self::Store(format!("Redis error: {}", err))
    }
}

impl From<deadpool_redis::CreatePoolError> for Error {
    fn from(err: deadpool_redis::CreatePoolError) -> Self {
        Self::Store(format!("Redis pool creation error: {}", err))
    }
}

impl From<deadpool_redis::PoolError> for Error {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Store(format!("Redis pool error: {}", err))
    }
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get error code for logs and diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Http(_) => "E_HTTP",
            Error::Json(_) => "E_JSON",
            Error::Io(_) => "E_IO",
            Error::Config(_) => "E_CONFIG",
            Error::RouteNotFound(_) => "E_ROUTE_NOT_FOUND",
            Error::PayloadTooLarge(_) => "E_PAYLOAD_TOO_LARGE",
            Error::Validation(_) => "E_VALIDATION",
            Error::Conflict(_) => "E_CONFLICT",
            Error::NotFound(_) => "E_NOT_FOUND",
            Error::InvalidId(_) => "E_INVALID_ID",
            Error::Store(_) => "E_STORE",
            Error::Internal(_) => "E_INTERNAL",
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::Conflict(_) | Error::Json(_) => 400,
            Error::NotFound(_) | Error::InvalidId(_) | Error::RouteNotFound(_) => 404,
            Error::PayloadTooLarge(_) => 413,
            _ => 500,
        }
    }

    /// Whether the error was caused by the client rather than the service
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_errors_map_to_client_statuses() {
        assert_eq!(Error::validation("Name and email are required").status_code(), 400);
        assert_eq!(Error::conflict("Email already exists").status_code(), 400);
        assert_eq!(Error::not_found("User not found").status_code(), 404);
        assert_eq!(Error::invalid_id("nope").status_code(), 404);
        assert!(Error::invalid_id("nope").is_client_error());
    }

    #[test]
    fn test_store_errors_are_server_errors_with_raw_message() {
        let err = Error::store("connection refused");
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "connection refused");
        assert!(!err.is_client_error());
        assert_eq!(Error::internal("boom").status_code(), 500);
    }

    #[test]
    fn test_invalid_id_reads_like_missing_user() {
        let err = Error::invalid_id("nonexistent-id");
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(err.error_code(), "E_INVALID_ID");
    }

    #[test]
    fn test_json_errors_are_bad_requests() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().starts_with("Invalid JSON body"));
    }
}
