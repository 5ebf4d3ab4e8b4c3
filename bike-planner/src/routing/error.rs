//! Routing provider error types.

use crate::domain::Location;

/// Errors from a routing provider.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Invalid API key or unauthorized
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// The per-key request quota is used up
    #[error("routing quota exhausted")]
    QuotaExhausted,

    /// The provider answered but found no route
    #[error("no route found between {from} and {to}")]
    NoRoute { from: Location, to: Location },

    /// Provider not configured
    #[error("not configured: {0}")]
    NotConfigured(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RoutingError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = RoutingError::QuotaExhausted;
        assert_eq!(err.to_string(), "routing quota exhausted");

        let err = RoutingError::NoRoute {
            from: Location::new(34.05, -118.25).unwrap(),
            to: Location::new(34.06, -118.24).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "no route found between 34.050000,-118.250000 and 34.060000,-118.240000"
        );
    }
}
