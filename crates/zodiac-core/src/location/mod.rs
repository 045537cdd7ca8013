//! Location Resolver: place text → coordinates.
//!
//! Resolution order, first hit wins: correction table, literal `lat,lon`, common-cities
//! table, runtime cache, live geocoder (rate limited, retried), broader-region fallback.

mod cache;
mod gazetteer;
mod geocoder;
mod resolver;
mod retry;

pub use cache::{BoundedGeocodeCache, GeocodeCache};
pub use gazetteer::{common_city, normalize_place, parse_coordinates, region_of};
pub use geocoder::{GeocodeError, Geocoder, NominatimGeocoder, RateLimiter};
pub use resolver::LocationResolver;
pub use retry::RetryPolicy;

use serde::{Deserialize, Serialize};

/// Which resolution path produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Coordinates,
    CommonCity,
    Cache,
    Geocoder,
    RegionFallback,
}

/// Geographic coordinates in decimal degrees (east and north positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub source: LocationSource,
}

impl ResolvedLocation {
    pub fn new(latitude: f64, longitude: f64, source: LocationSource) -> Self {
        Self {
            latitude,
            longitude,
            source,
        }
    }

    pub fn with_source(self, source: LocationSource) -> Self {
        Self { source, ..self }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
