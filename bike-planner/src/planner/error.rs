//! Planning error taxonomy.
//!
//! Callers branch on [`ErrorCode`], never on message text.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::plan::PlanStage;

/// Stable machine-readable failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No station near the start has a bike.
    NoBikeStation,
    /// No station near the destination has a free dock.
    NoDockStation,
    /// The routing quota cannot pay for any search.
    NoCredits,
    /// No candidate pair produced a complete route.
    RoutingFailed,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoBikeStation => "NO_BIKE_STATION",
            ErrorCode::NoDockStation => "NO_DOCK_STATION",
            ErrorCode::NoCredits => "NO_CREDITS",
            ErrorCode::RoutingFailed => "ROUTING_FAILED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from route planning.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("no nearby station with available bikes")]
    NoBikeStation,

    #[error("no nearby station with free docks")]
    NoDockStation,

    #[error("no routing credits left")]
    NoCredits,

    #[error("routing failed: {0}")]
    RoutingFailed(String),

    /// The caller cancelled the request.
    #[error("route planning cancelled")]
    Cancelled,

    #[error("route planning exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    /// Unexpected failure. `source` keeps the original error for logs.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PlanError {
    /// Wrap an unexpected error raised while in `stage`.
    pub fn internal<E>(stage: PlanStage, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PlanError::Internal {
            message: format!("{stage}: {err}"),
            source: Some(Box::new(err)),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PlanError::NoBikeStation => ErrorCode::NoBikeStation,
            PlanError::NoDockStation => ErrorCode::NoDockStation,
            PlanError::NoCredits => ErrorCode::NoCredits,
            PlanError::RoutingFailed(_) => ErrorCode::RoutingFailed,
            PlanError::Cancelled | PlanError::DeadlineExceeded(_) | PlanError::Internal { .. } => {
                ErrorCode::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::stations::StationError;

    #[test]
    fn codes() {
        assert_eq!(PlanError::NoBikeStation.code(), ErrorCode::NoBikeStation);
        assert_eq!(PlanError::NoDockStation.code(), ErrorCode::NoDockStation);
        assert_eq!(PlanError::NoCredits.code(), ErrorCode::NoCredits);
        assert_eq!(
            PlanError::RoutingFailed("x".into()).code(),
            ErrorCode::RoutingFailed
        );
        assert_eq!(PlanError::Cancelled.code(), ErrorCode::Internal);
        assert_eq!(
            PlanError::DeadlineExceeded(Duration::from_secs(1)).code(),
            ErrorCode::Internal
        );
    }

    #[test]
    fn code_strings_match_serde() {
        for code in [
            ErrorCode::NoBikeStation,
            ErrorCode::NoDockStation,
            ErrorCode::NoCredits,
            ErrorCode::RoutingFailed,
            ErrorCode::Internal,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
        }
    }

    #[test]
    fn internal_keeps_source() {
        let err = PlanError::internal(
            PlanStage::Init,
            StationError::Unavailable("db down".into()),
        );

        assert_eq!(
            err.to_string(),
            "internal error: fetching stations: station store unavailable: db down"
        );
        assert!(err.source().is_some());
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            PlanError::NoBikeStation.to_string(),
            "no nearby station with available bikes"
        );
        assert_eq!(
            PlanError::RoutingFailed("could not calculate any route".into()).to_string(),
            "routing failed: could not calculate any route"
        );
    }
}
