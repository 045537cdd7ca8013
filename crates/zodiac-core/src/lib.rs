//! zodiac-core: birth-chart coordination layer for the Zodiac Oracle gateway.
//!
//! Validates birth details, resolves the birth place to coordinates, converts local
//! time to a Julian day, asks an ephemeris backend for Sun/Moon/Ascendant longitudes
//! and bins them into zodiac signs. A keyword chat responder reads the stored chart.

pub mod chart;
pub mod chat;
mod config;
mod error;
pub mod location;
pub mod personality;
pub mod service;
pub mod session;
pub mod validation;

pub use config::{
    AppConfig, EphemerisBackend, EphemerisConfig, GeocoderConfig, SessionConfig, TraitModel, TraitsConfig,
};
pub use error::{AstroError, AstroResult};

pub use chart::{
    ensure_ephemeris_files, julian_day, local_to_utc, AnalyticEphemeris, ChartCalculator,
    ChartResult, Ephemeris, EphemerisError, StaticTimezoneLookup, TimezoneLookup,
    TzfTimezoneLookup, ZodiacSign, EPHEMERIS_FILES,
};
#[cfg(feature = "swiss-ephemeris")]
pub use chart::SwissEphemeris;
pub use chat::{tokenize, ChatResponder, DEFAULT_SIGN};
pub use location::{
    BoundedGeocodeCache, GeocodeCache, GeocodeError, Geocoder, LocationResolver, LocationSource,
    NominatimGeocoder, RateLimiter, ResolvedLocation, RetryPolicy,
};
pub use personality::{
    FixedTraitScorer, RegressionTraitScorer, TraitScorer, TraitScores, TRAITS_PLACEHOLDER,
};
pub use service::AstroService;
pub use session::{SessionChart, SessionStore, DEFAULT_SESSION, DEFAULT_SESSION_CAPACITY};
pub use validation::{validate, BirthDetailsRequest, BirthQuery};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
