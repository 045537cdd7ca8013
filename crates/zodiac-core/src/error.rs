//! Error taxonomy for the birth-chart pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type AstroResult<T> = Result<T, AstroError>;

/// Every failure a `/process` or `/process_message` request can surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstroError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid {field} '{value}': expected {expected}")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid coordinates '{0}': latitude must be within ±90 and longitude within ±180")]
    InvalidCoordinates(String),

    #[error("Geocoding service unavailable for '{place}': {reason}")]
    GeocodingUnavailable { place: String, reason: String },

    #[error("Invalid place '{0}'. Try a specific city (e.g., Visakhapatnam, India).")]
    PlaceNotFound(String),

    #[error("Timezone not found for coordinates ({lat:.4}, {lon:.4})")]
    TimezoneNotFound { lat: f64, lon: f64 },

    #[error("Astrological calculation failed: {0}")]
    CalculationFailed(String),

    #[error("Trait scoring failed: {0}")]
    TraitScoring(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AstroError {
    /// Stable short code for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "missing_fields",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::InvalidCoordinates(_) => "invalid_coordinates",
            Self::GeocodingUnavailable { .. } => "geocoding_unavailable",
            Self::PlaceNotFound(_) => "place_not_found",
            Self::TimezoneNotFound { .. } => "timezone_not_found",
            Self::CalculationFailed(_) => "calculation_failed",
            Self::TraitScoring(_) => "trait_scoring_failed",
            Self::Internal(_) => "internal",
        }
    }
}
