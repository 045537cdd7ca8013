//! Static place data: spelling corrections, pre-seeded cities and coordinate parsing.

use super::{LocationSource, ResolvedLocation};
use crate::error::{AstroError, AstroResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Substring corrections applied to the lower-cased place before any lookup.
const CORRECTIONS: &[(&str, &str)] = &[
    ("vishakaptanam", "visakhapatnam"),
    ("vishakapatnam", "visakhapatnam"),
    ("visakapatnam", "visakhapatnam"),
    ("vizag", "visakhapatnam"),
    ("bombay", "mumbai"),
    ("calcutta", "kolkata"),
    ("madras", "chennai"),
    ("bangalore", "bengaluru"),
];

/// Pre-seeded coordinates for frequently requested places, keyed by normalized name.
const COMMON_CITIES: &[(&str, f64, f64)] = &[
    ("visakhapatnam", 17.6868, 83.2185),
    ("visakhapatnam, india", 17.6868, 83.2185),
    ("visakhapatnam, andhra pradesh, india", 17.6868, 83.2185),
    ("hyderabad", 17.3850, 78.4867),
    ("hyderabad, india", 17.3850, 78.4867),
    ("vijayawada", 16.5062, 80.6480),
    ("vijayawada, india", 16.5062, 80.6480),
    ("mumbai", 19.0760, 72.8777),
    ("mumbai, india", 19.0760, 72.8777),
    ("delhi", 28.7041, 77.1025),
    ("delhi, india", 28.7041, 77.1025),
    ("new delhi", 28.6139, 77.2090),
    ("new delhi, india", 28.6139, 77.2090),
    ("bengaluru", 12.9716, 77.5946),
    ("bengaluru, india", 12.9716, 77.5946),
    ("chennai", 13.0827, 80.2707),
    ("chennai, india", 13.0827, 80.2707),
    ("kolkata", 22.5726, 88.3639),
    ("kolkata, india", 22.5726, 88.3639),
    ("india", 20.5937, 78.9629),
    ("london", 51.5074, -0.1278),
    ("london, uk", 51.5074, -0.1278),
    ("paris", 48.8566, 2.3522),
    ("paris, france", 48.8566, 2.3522),
    ("new york", 40.7128, -74.0060),
    ("new york, usa", 40.7128, -74.0060),
    ("los angeles", 34.0522, -118.2437),
    ("tokyo", 35.6762, 139.6503),
    ("sydney", -33.8688, 151.2093),
];

static COORDINATE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?\d+(?:\.\d+)?)\s*,\s*([+-]?\d+(?:\.\d+)?)\s*$")
        .expect("coordinate pattern is valid")
});

/// Trim, lower-case, collapse inner whitespace and apply the correction table.
pub fn normalize_place(raw: &str) -> String {
    let mut place = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    for (wrong, right) in CORRECTIONS {
        if place.contains(wrong) {
            place = place.replace(wrong, right);
        }
    }
    place
}

/// `Some(Ok(..))` when the text is a numeric `lat,lon` pair, `Some(Err(..))` when the pair is
/// out of range, `None` when the text is not a coordinate pair at all.
pub fn parse_coordinates(place: &str) -> Option<AstroResult<ResolvedLocation>> {
    let caps = COORDINATE_PAIR.captures(place)?;
    let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let lon = caps.get(2)?.as_str().parse::<f64>().ok()?;
    let loc = ResolvedLocation::new(lat, lon, LocationSource::Coordinates);
    if loc.is_valid() {
        Some(Ok(loc))
    } else {
        Some(Err(AstroError::InvalidCoordinates(place.trim().to_string())))
    }
}

/// Exact lookup in the pre-seeded table. `place` must already be normalized.
pub fn common_city(place: &str) -> Option<ResolvedLocation> {
    COMMON_CITIES
        .iter()
        .find(|(name, _, _)| *name == place)
        .map(|(_, lat, lon)| ResolvedLocation::new(*lat, *lon, LocationSource::CommonCity))
}

/// The broader region named after the last comma, e.g. `"india"` for `"gajuwaka, india"`.
pub fn region_of(place: &str) -> Option<&str> {
    let (_, region) = place.rsplit_once(',')?;
    let region = region.trim();
    if region.is_empty() {
        None
    } else {
        Some(region)
    }
}
