use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the flight network library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when an airport code is not present in the network.
    #[error("unknown airport code: {code}{}", format_suggestions(.suggestions))]
    UnknownAirport {
        code: String,
        suggestions: Vec<String>,
    },

    /// Raised when the destination cannot be reached from the origin.
    #[error("no connecting flight path from {origin} to {destination}")]
    NoPath { origin: String, destination: String },

    /// Raised when sampling cannot produce a usable result.
    #[error("degenerate network: {reason}")]
    DegenerateNetwork { reason: String },

    /// Raised when two airport records share the same code.
    #[error("duplicate airport code: {code}")]
    DuplicateAirport { code: String },

    /// Raised when the same airline route is supplied more than once.
    #[error("duplicate route {origin} -> {destination} operated by {airline}")]
    DuplicateRoute {
        origin: String,
        destination: String,
        airline: String,
    },

    /// Raised when a route references an airport that was never supplied.
    #[error("route {origin} -> {destination} references unknown airport {missing}")]
    UnknownRouteEndpoint {
        origin: String,
        destination: String,
        missing: String,
    },

    /// Raised when a route departs from and arrives at the same airport.
    #[error("route operated by {airline} loops back to {code}")]
    SelfLoopRoute { code: String, airline: String },

    /// Raised when a path enumeration is cancelled by its caller.
    #[error("path search cancelled")]
    SearchCancelled,

    /// No suitable project directories could be resolved for this platform.
    #[error(
        "failed to resolve a default data directory; pass --data-dir or set FLIGHTNET_DATA_DIR"
    )]
    ProjectDirsUnavailable,

    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Raised when dataset rows fail validation.
    #[error("invalid dataset: {message}")]
    DatasetValidation { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON snapshot errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_airport_lists_suggestions() {
        let err = Error::UnknownAirport {
            code: "LHX".to_string(),
            suggestions: vec!["LHR".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown airport code: LHX. Did you mean 'LHR'?"
        );

        let err = Error::UnknownAirport {
            code: "JF".to_string(),
            suggestions: vec!["JFK".to_string(), "JFA".to_string()],
        };
        assert!(err.to_string().contains("one of: 'JFK', 'JFA'"));
    }

    #[test]
    fn unknown_airport_without_suggestions_is_plain() {
        let err = Error::UnknownAirport {
            code: "ZZZ".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(err.to_string(), "unknown airport code: ZZZ");
    }
}
