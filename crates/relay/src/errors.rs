//! Error taxonomy for the relay.
//!
//! Every request-scoped failure is terminal: it is produced by the first gate
//! that rejects the request and is returned to the caller unchanged. Nothing
//! is retried and nothing is recovered locally.
//!
//! The `Display` form of each request-scoped variant is exactly the response
//! body the caller receives, and [`RelayError::status_code`] gives the HTTP
//! status. The `listener` crate relies on both.

use thiserror::Error;

/// Errors produced while relaying a request, plus the start-up
/// [`RelayError::Configuration`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The request used a method other than `POST`.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// The `x-api-key` header was absent or did not match the shared secret.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request body exceeded the listener's size limit or could not be
    /// read in full. Only reported once the method and api key are accepted.
    #[error("Payload Too Large")]
    PayloadTooLarge {
        /// Limit in bytes that was applied.
        limit: usize,
    },

    /// The request body was not valid JSON.
    #[error("Invalid JSON")]
    InvalidPayload,

    /// A required field was absent, `null`, or blank.
    ///
    /// Names the first such field in [`crate::REQUIRED_FIELDS`] order.
    #[error("Missing field: {field}")]
    MissingField {
        /// Name of the first missing field.
        field: &'static str,
    },

    /// The dispatch API answered with a non-success status.
    #[error("GitHub API error: {status}\n{body}")]
    UpstreamError {
        /// Numeric HTTP status returned by the dispatch API.
        status: u16,
        /// Response body text returned by the dispatch API.
        body: String,
    },

    /// The dispatch API could not be reached (DNS, connect, TLS, or body
    /// read failure).
    #[error("GitHub API unreachable: {reason}")]
    UpstreamUnreachable {
        /// Transport error description.
        reason: String,
    },

    /// The relay configuration is invalid.
    ///
    /// Produced at start-up only; the server never starts with an invalid
    /// config, so no request ever sees this variant.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl RelayError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::MethodNotAllowed => 405,
            RelayError::Unauthorized => 401,
            RelayError::PayloadTooLarge { .. } => 413,
            RelayError::InvalidPayload | RelayError::MissingField { .. } => 400,
            RelayError::UpstreamError { .. } => 500,
            RelayError::UpstreamUnreachable { .. } => 502,
            RelayError::Configuration { .. } => 500,
        }
    }

    /// Short machine-readable name of the variant, used as a tracing field.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "method_not_allowed",
            RelayError::Unauthorized => "unauthorized",
            RelayError::PayloadTooLarge { .. } => "payload_too_large",
            RelayError::InvalidPayload => "invalid_payload",
            RelayError::MissingField { .. } => "missing_field",
            RelayError::UpstreamError { .. } => "upstream_error",
            RelayError::UpstreamUnreachable { .. } => "upstream_unreachable",
            RelayError::Configuration { .. } => "configuration",
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        RelayError::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_bodies() {
        assert_eq!(RelayError::MethodNotAllowed.to_string(), "Method Not Allowed");
        assert_eq!(RelayError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(RelayError::InvalidPayload.to_string(), "Invalid JSON");
        assert_eq!(
            RelayError::PayloadTooLarge { limit: 1024 }.to_string(),
            "Payload Too Large"
        );
        assert_eq!(
            RelayError::MissingField { field: "service_price" }.to_string(),
            "Missing field: service_price"
        );
        assert_eq!(
            RelayError::UpstreamError {
                status: 422,
                body: "bad input".to_string(),
            }
            .to_string(),
            "GitHub API error: 422\nbad input"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(RelayError::MethodNotAllowed.status_code(), 405);
        assert_eq!(RelayError::Unauthorized.status_code(), 401);
        assert_eq!(RelayError::InvalidPayload.status_code(), 400);
        assert_eq!(RelayError::PayloadTooLarge { limit: 1024 }.status_code(), 413);
        assert_eq!(RelayError::MissingField { field: "file_no" }.status_code(), 400);
        assert_eq!(
            RelayError::UpstreamError {
                status: 404,
                body: String::new(),
            }
            .status_code(),
            500
        );
        assert_eq!(
            RelayError::UpstreamUnreachable {
                reason: "connection refused".to_string(),
            }
            .status_code(),
            502
        );
    }
}
