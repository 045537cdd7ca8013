use super::gazetteer::{common_city, normalize_place, parse_coordinates, region_of};
use super::{
    BoundedGeocodeCache, GeocodeCache, GeocodeError, Geocoder, LocationSource, NominatimGeocoder,
    RateLimiter, ResolvedLocation, RetryPolicy,
};
use crate::config::GeocoderConfig;
use crate::error::{AstroError, AstroResult};
use std::sync::Arc;

/// Resolves birth-place text to coordinates. One instance is shared by every request.
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: Arc<dyn GeocodeCache>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl LocationResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        cache: Arc<dyn GeocodeCache>,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            geocoder,
            cache,
            limiter,
            retry,
        }
    }

    /// Nominatim client, LRU cache and rate limiter as configured.
    pub fn from_config(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        Ok(Self::new(
            Arc::new(NominatimGeocoder::new(config)?),
            Arc::new(BoundedGeocodeCache::new(config.cache_capacity)),
            Arc::new(RateLimiter::new(config.min_interval())),
            config.retry_policy(),
        ))
    }

    pub fn cache(&self) -> &Arc<dyn GeocodeCache> {
        &self.cache
    }

    /// A failed live lookup is reported as-is; only a place the geocoder does not know
    /// falls back to its region.
    pub async fn resolve(&self, raw: &str) -> AstroResult<ResolvedLocation> {
        let place = normalize_place(raw);
        if place.is_empty() {
            return Err(AstroError::MissingFields(vec!["birth_place".to_string()]));
        }
        if let Some(parsed) = parse_coordinates(&place) {
            return parsed;
        }

        let original = raw.trim();
        if let Some(loc) = self.lookup(&place).await.map_err(|e| unavailable(original, e))? {
            return Ok(loc);
        }

        if let Some(region) = region_of(&place) {
            tracing::info!(target: "zodiac::location", %place, %region, "falling back to region");
            if let Some(loc) = self.lookup(region).await.map_err(|e| unavailable(original, e))? {
                return Ok(loc.with_source(LocationSource::RegionFallback));
            }
        }

        tracing::warn!(target: "zodiac::location", place = %original, "place not found");
        Err(AstroError::PlaceNotFound(original.to_string()))
    }

    /// Static table, then cache, then the live geocoder. `place` is already normalized.
    async fn lookup(&self, place: &str) -> Result<Option<ResolvedLocation>, GeocodeError> {
        if let Some(loc) = common_city(place) {
            return Ok(Some(loc));
        }
        if let Some(loc) = self.cache.get(place) {
            tracing::debug!(target: "zodiac::location", %place, "geocode cache hit");
            return Ok(Some(loc));
        }

        let found = self
            .retry
            .run(GeocodeError::is_retryable, move |attempt| async move {
                self.limiter.acquire().await;
                tracing::debug!(target: "zodiac::location", %place, attempt, "live geocoder call");
                self.geocoder.geocode(place).await
            })
            .await?;

        Ok(found.map(|loc| {
            self.cache
                .insert(place, loc)
                .with_source(LocationSource::Geocoder)
        }))
    }
}

fn unavailable(place: &str, e: GeocodeError) -> AstroError {
    tracing::error!(target: "zodiac::location", %place, error = %e, "geocoding unavailable");
    AstroError::GeocodingUnavailable {
        place: place.to_string(),
        reason: e.to_string(),
    }
}
