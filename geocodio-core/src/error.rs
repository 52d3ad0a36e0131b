use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by geocoding operations.
///
/// Validation variants are returned before any request is sent. Transport and
/// decode failures are passed through as-is; none of them poison the client.
#[derive(Debug, Error)]
pub enum GeocodioError {
    /// No API key was supplied, or it was blank.
    #[error(
        "Missing Geocodio API key.\n\
         Hint: set GEOCODIO_API_KEY or run `geocodio configure`."
    )]
    MissingApiKey,

    /// Forward lookup with an empty or whitespace-only address.
    #[error("Address must not be empty")]
    EmptyAddress,

    /// Reverse lookup with latitude and longitude both exactly 0.0.
    #[error("Latitude and longitude are missing (0.0, 0.0)")]
    MissingCoordinates,

    /// Batch lookup with nothing to look up.
    #[error("Batch request must contain at least one query")]
    EmptyBatch,

    /// Flat coordinate list that cannot be split into lat/lng pairs.
    #[error("Expected latitude/longitude pairs, got {0} values")]
    OddCoordinateCount(usize),

    /// The service answered successfully but returned no candidates.
    #[error("No results found")]
    NoResultsFound,

    /// The HTTP exchange failed: network error or non-success status.
    #[error("{}", transport_message(.status, .message))]
    TransportFailure {
        status: Option<StatusCode>,
        message: String,
    },

    /// The response body was not valid JSON for the expected shape.
    #[error("Failed to decode Geocodio response: {0}")]
    DecodeFailure(String),
}

impl GeocodioError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure { status: None, message: message.into() }
    }

    /// Status code of a failed exchange, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::TransportFailure { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GeocodioError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeFailure(err.to_string())
    }
}

fn transport_message(status: &Option<StatusCode>, message: &str) -> String {
    match status {
        Some(status) => format!("Geocodio request failed with status {status}: {message}"),
        None => format!("Geocodio request failed: {message}"),
    }
}
