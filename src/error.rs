use thiserror::Error;

/// Type alias for Result with GmailError
pub type Result<T> = std::result::Result<T, GmailError>;

/// Error types for the subject reader
#[derive(Error, Debug)]
pub enum GmailError {
    /// Client secret descriptor is missing or unreadable
    #[error("Client secrets not found: {0}")]
    SecretsNotFound(String),

    /// Authorization flow failed (user denial, token exchange, cache I/O)
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Interactive authorization did not complete in time
    #[error("Authorization timed out after {timeout_secs} seconds")]
    AuthTimeout { timeout_secs: u64 },

    /// Gmail API returned an error
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Rate limit exceeded
    ///
    /// `retry_after` echoes the server's Retry-After hint for the user;
    /// nothing in this crate waits on it.
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Resource not found (404)
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Message returned by the API is missing required fields
    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    /// Listing limit must be positive
    #[error("Invalid message limit: {0} (must be at least 1)")]
    InvalidLimit(u32),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl GmailError {
    /// Errors raised while obtaining a credential
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            GmailError::SecretsNotFound(_)
                | GmailError::AuthError(_)
                | GmailError::AuthTimeout { .. }
        )
    }

    /// Errors raised by a remote call that reached (or tried to reach) the API
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GmailError::ApiError(_)
                | GmailError::RateLimitExceeded { .. }
                | GmailError::NetworkError(_)
                | GmailError::ServerError { .. }
                | GmailError::BadRequest(_)
                | GmailError::Forbidden(_)
        )
    }
}

/// Parse the Retry-After header from an HTTP response
///
/// The value is only reported in diagnostics. Only the delay-seconds form
/// is understood; a missing header or an HTTP-date yields 5 seconds.
fn parse_retry_after_header<B>(response: &hyper::Response<B>) -> u64 {
    const DEFAULT_RETRY_AFTER: u64 = 5;

    response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

impl From<google_gmail1::Error> for GmailError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            // HTTP response with status code (non-success responses)
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let status_code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    status_code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match status_code {
                    429 => GmailError::RateLimitExceeded {
                        retry_after: parse_retry_after_header(response),
                    },
                    404 => GmailError::MessageNotFound("Resource not found".to_string()),
                    400 => GmailError::BadRequest(message),
                    403 => GmailError::Forbidden(message),
                    500..=599 => GmailError::ServerError {
                        status: status_code,
                        message,
                    },
                    _ => GmailError::ApiError(message),
                }
            }
            google_gmail1::Error::BadRequest(ref err) => GmailError::BadRequest(format!("{}", err)),
            google_gmail1::Error::HttpError(ref err) => {
                GmailError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => GmailError::NetworkError(err.to_string()),
            // The hub could not obtain a token for the request
            google_gmail1::Error::MissingToken(ref err) => {
                GmailError::AuthError(format!("No access token available: {}", err))
            }
            _ => GmailError::ApiError(error.to_string()),
        }
    }
}
