//! Per-session chart storage read by the chat responder.

use crate::chart::{ChartResult, ZodiacSign};
use crate::validation::BirthQuery;
use chrono::{NaiveDate, NaiveTime};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Slot shared by every client that does not send a session id.
pub const DEFAULT_SESSION: &str = "default";

pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

/// The most recent chart computed for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionChart {
    pub name: String,
    pub sun_sign: ZodiacSign,
    pub moon_sign: ZodiacSign,
    pub ascendant: ZodiacSign,
    pub traits: String,
    pub birth_date: NaiveDate,
    pub birth_time: NaiveTime,
}

impl SessionChart {
    pub fn new(query: &BirthQuery, chart: &ChartResult) -> Self {
        Self {
            name: query.name.clone(),
            sun_sign: chart.sun_sign,
            moon_sign: chart.moon_sign,
            ascendant: chart.ascendant,
            traits: chart.traits.clone(),
            birth_date: query.date,
            birth_time: query.time,
        }
    }
}

/// Concurrent map from session key to chart; last writer wins per key.
///
/// Holds at most `capacity` sessions (0 = no limit). Adding a new key to a full store
/// drops the session that was written least recently.
#[derive(Debug)]
pub struct SessionStore {
    capacity: usize,
    charts: DashMap<String, (SessionChart, u64)>,
    clock: AtomicU64,
    /// serializes insertion of new keys so the bound holds under concurrent writers
    admit: Mutex<()>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            charts: DashMap::new(),
            clock: AtomicU64::new(0),
            admit: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blank or absent keys map to [`DEFAULT_SESSION`].
    pub fn key(session: Option<&str>) -> String {
        session
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION)
            .to_string()
    }

    pub fn put(&self, session: Option<&str>, chart: SessionChart) {
        let key = Self::key(session);
        let stamp = self.clock.fetch_add(1, Ordering::Relaxed);
        if let Some(mut slot) = self.charts.get_mut(&key) {
            *slot = (chart, stamp);
            return;
        }

        let _admit = self.admit.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.capacity > 0 && !self.charts.contains_key(&key) {
            while self.charts.len() >= self.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }
        self.charts.insert(key, (chart, stamp));
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .charts
            .iter()
            .min_by_key(|entry| entry.value().1)
            .map(|entry| entry.key().clone());
        match oldest {
            Some(key) => {
                self.charts.remove(&key);
                tracing::debug!(target: "zodiac::session", session = %key, "session evicted");
                true
            }
            None => false,
        }
    }

    pub fn get(&self, session: Option<&str>) -> Option<SessionChart> {
        self.charts
            .get(&Self::key(session))
            .map(|entry| entry.value().0.clone())
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(name: &str, sun: ZodiacSign) -> SessionChart {
        SessionChart {
            name: name.into(),
            sun_sign: sun,
            moon_sign: sun,
            ascendant: sun,
            traits: String::new(),
            birth_date: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            birth_time: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn blank_session_is_the_default_slot() {
        assert_eq!(SessionStore::key(None), DEFAULT_SESSION);
        assert_eq!(SessionStore::key(Some("  ")), DEFAULT_SESSION);
        assert_eq!(SessionStore::key(Some(" abc ")), "abc");
    }

    #[test]
    fn sessions_are_isolated_and_default_is_last_writer_wins() {
        let store = SessionStore::new();
        store.put(Some("a"), chart("A", ZodiacSign::Leo));
        store.put(None, chart("X", ZodiacSign::Gemini));
        store.put(None, chart("Y", ZodiacSign::Libra));

        assert_eq!(store.get(Some("a")).unwrap().name, "A");
        assert_eq!(store.get(None).unwrap().name, "Y");
        assert!(store.get(Some("b")).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn full_store_drops_the_least_recently_written_session() {
        let store = SessionStore::with_capacity(3);
        for i in 0..10 {
            store.put(Some(&format!("s{i}")), chart(&format!("N{i}"), ZodiacSign::Taurus));
            assert!(store.len() <= 3);
        }
        assert_eq!(store.len(), 3);
        assert!(store.get(Some("s0")).is_none());
        assert!(store.get(Some("s6")).is_none());
        assert_eq!(store.get(Some("s9")).unwrap().name, "N9");

        // rewriting an existing key refreshes it and never evicts
        store.put(Some("s7"), chart("N7b", ZodiacSign::Virgo));
        store.put(Some("s10"), chart("N10", ZodiacSign::Virgo));
        assert_eq!(store.len(), 3);
        assert!(store.get(Some("s8")).is_none());
        assert_eq!(store.get(Some("s7")).unwrap().name, "N7b");
    }

    #[test]
    fn concurrent_writers_stay_within_capacity() {
        let store = std::sync::Arc::new(SessionStore::with_capacity(50));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..500 {
                        store.put(Some(&format!("t{t}-{i}")), chart("N", ZodiacSign::Aries));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn zero_capacity_keeps_everything() {
        let store = SessionStore::with_capacity(0);
        for i in 0..2_000 {
            store.put(Some(&format!("s{i}")), chart("N", ZodiacSign::Aries));
        }
        assert_eq!(store.len(), 2_000);
    }
}
