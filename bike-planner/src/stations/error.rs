//! Station store error types.

use std::path::PathBuf;

use crate::domain::{InvalidLocation, StationId};

/// Errors that can occur when querying or loading station data.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Snapshot file could not be read
    #[error("failed to read station snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot JSON could not be parsed
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// A station record has unusable coordinates
    #[error("station {id} has invalid coordinates: {source}")]
    InvalidStation {
        id: StationId,
        #[source]
        source: InvalidLocation,
    },

    /// The backing store could not answer the query
    #[error("station store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StationError::Json {
            message: "expected value".into(),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected value");

        let err = StationError::Unavailable("connection refused".into());
        assert_eq!(
            err.to_string(),
            "station store unavailable: connection refused"
        );
    }
}
