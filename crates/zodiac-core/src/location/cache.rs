//! Runtime geocode cache: normalized place name → resolved coordinates.

use super::{LocationSource, ResolvedLocation};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Capability interface for the geocode cache shared by all resolvers.
pub trait GeocodeCache: Send + Sync {
    fn get(&self, place: &str) -> Option<ResolvedLocation>;

    /// Inserts unless another resolver got there first; returns the entry that is now cached.
    fn insert(&self, place: &str, location: ResolvedLocation) -> ResolvedLocation;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, (ResolvedLocation, u64)>,
    /// use tick → key; the smallest tick is the least recently used entry
    recency: BTreeMap<u64, String>,
    tick: u64,
}

impl Inner {
    fn touch(&mut self, place: &str) -> Option<ResolvedLocation> {
        self.tick += 1;
        let tick = self.tick;
        let (loc, old_tick) = self.entries.get_mut(place)?;
        let previous = std::mem::replace(old_tick, tick);
        let loc = *loc;
        self.recency.remove(&previous);
        self.recency.insert(tick, place.to_string());
        Some(loc)
    }
}

/// LRU cache behind a single mutex. Capacity 0 keeps every entry for the process lifetime.
pub struct BoundedGeocodeCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl BoundedGeocodeCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GeocodeCache for BoundedGeocodeCache {
    fn get(&self, place: &str) -> Option<ResolvedLocation> {
        self.lock()
            .touch(place)
            .map(|loc| loc.with_source(LocationSource::Cache))
    }

    fn insert(&self, place: &str, location: ResolvedLocation) -> ResolvedLocation {
        let mut inner = self.lock();
        if let Some(existing) = inner.touch(place) {
            return existing;
        }
        if self.capacity > 0 && inner.entries.len() >= self.capacity {
            if let Some((_, evicted)) = inner.recency.pop_first() {
                inner.entries.remove(&evicted);
                tracing::debug!(target: "zodiac::location", place = %evicted, "geocode cache eviction");
            }
        }
        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.insert(place.to_string(), (location, tick));
        inner.recency.insert(tick, place.to_string());
        location
    }

    fn len(&self) -> usize {
        self.lock().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64) -> ResolvedLocation {
        ResolvedLocation::new(lat, 0.0, LocationSource::Geocoder)
    }

    #[test]
    fn hit_reports_cache_source() {
        let cache = BoundedGeocodeCache::new(4);
        cache.insert("paris", loc(48.85));
        let hit = cache.get("paris").unwrap();
        assert_eq!(hit.latitude, 48.85);
        assert_eq!(hit.source, LocationSource::Cache);
        assert!(cache.get("lyon").is_none());
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = BoundedGeocodeCache::new(2);
        cache.insert("a", loc(1.0));
        cache.insert("b", loc(2.0));
        cache.get("a");
        cache.insert("c", loc(3.0));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn first_writer_wins() {
        let cache = BoundedGeocodeCache::unbounded();
        cache.insert("x", loc(1.0));
        let kept = cache.insert("x", loc(9.0));
        assert_eq!(kept.latitude, 1.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unbounded_never_evicts() {
        let cache = BoundedGeocodeCache::unbounded();
        for i in 0..500 {
            cache.insert(&format!("place-{i}"), loc(i as f64 / 10.0));
        }
        assert_eq!(cache.len(), 500);
    }
}
