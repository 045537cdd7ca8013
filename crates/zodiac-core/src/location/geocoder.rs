//! Live geocoding: the `Geocoder` seam, the Nominatim client and the process-wide rate limiter.

use super::{LocationSource, ResolvedLocation};
use crate::config::GeocoderConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Errors from a single live geocoding call.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder connection failed: {0}")]
    Transport(String),

    #[error("geocoder request timed out")]
    Timeout,

    #[error("geocoder returned HTTP {0}")]
    Http(u16),

    #[error("geocoder response could not be parsed: {0}")]
    Parse(String),
}

impl GeocodeError {
    /// Transport failures, timeouts, throttling and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Http(status) => *status == 429 || *status >= 500,
            Self::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodeError::Timeout
        } else if err.is_decode() {
            GeocodeError::Parse(err.to_string())
        } else {
            GeocodeError::Transport(err.to_string())
        }
    }
}

/// Free-text place → coordinates. `Ok(None)` means the service answered but knows no such place.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<ResolvedLocation>, GeocodeError>;
}

/// Nominatim (OpenStreetMap) search client.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Raw Nominatim search hit; coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

fn parse_hits(hits: &[NominatimHit]) -> Result<Option<ResolvedLocation>, GeocodeError> {
    let Some(hit) = hits.first() else {
        return Ok(None);
    };
    let lat: f64 = hit
        .lat
        .trim()
        .parse()
        .map_err(|_| GeocodeError::Parse(format!("invalid latitude '{}'", hit.lat)))?;
    let lon: f64 = hit
        .lon
        .trim()
        .parse()
        .map_err(|_| GeocodeError::Parse(format!("invalid longitude '{}'", hit.lon)))?;
    let loc = ResolvedLocation::new(lat, lon, LocationSource::Geocoder);
    if !loc.is_valid() {
        return Err(GeocodeError::Parse(format!("coordinates out of range: {lat},{lon}")));
    }
    Ok(Some(loc))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<ResolvedLocation>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Http(status.as_u16()));
        }

        let hits: Vec<NominatimHit> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;
        let found = parse_hits(&hits)?;
        if let (Some(loc), Some(hit)) = (found.as_ref(), hits.first()) {
            tracing::debug!(
                target: "zodiac::location",
                %query,
                lat = loc.latitude,
                lon = loc.longitude,
                display_name = hit.display_name.as_deref().unwrap_or(""),
                "nominatim hit"
            );
        }
        Ok(found)
    }
}

/// Cooperative process-wide spacing between consecutive live geocoder calls.
///
/// The lock is held across the sleep, so concurrent callers queue up and each call
/// starts at least `min_interval` after the previous one.
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next call is allowed and records it as started.
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(target: "zodiac::location", ?wait, "rate limiting geocoder call");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}
