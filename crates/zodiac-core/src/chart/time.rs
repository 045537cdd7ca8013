//! Coordinates → IANA zone, local civil time → UTC, UTC → Julian day.

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

/// Resolves the time zone in force at a geographic position.
pub trait TimezoneLookup: Send + Sync {
    fn zone_at(&self, latitude: f64, longitude: f64) -> Option<Tz>;
}

/// Polygon lookup over the timezone-boundary dataset embedded in tzf-rs.
pub struct TzfTimezoneLookup {
    finder: tzf_rs::DefaultFinder,
}

impl TzfTimezoneLookup {
    pub fn new() -> Self {
        Self {
            finder: tzf_rs::DefaultFinder::new(),
        }
    }
}

impl Default for TzfTimezoneLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl TimezoneLookup for TzfTimezoneLookup {
    fn zone_at(&self, latitude: f64, longitude: f64) -> Option<Tz> {
        let name = self.finder.get_tz_name(longitude, latitude);
        if name.is_empty() {
            return None;
        }
        name.parse::<Tz>().ok()
    }
}

/// Answers with one fixed zone (or none) for every position.
#[derive(Debug, Clone, Copy)]
pub struct StaticTimezoneLookup(pub Option<Tz>);

impl TimezoneLookup for StaticTimezoneLookup {
    fn zone_at(&self, _latitude: f64, _longitude: f64) -> Option<Tz> {
        self.0
    }
}

/// Interprets `date time` as wall-clock time in `tz`.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times inside a
/// spring-forward gap keep the offset that was in force before the gap.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = NaiveDateTime::new(date, time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let before_gap = naive - chrono::Duration::hours(24);
            let offset = tz.offset_from_utc_datetime(&before_gap).fix();
            let utc = naive - chrono::Duration::seconds(i64::from(offset.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

/// Astronomical Julian date (Gregorian calendar) with the time of day as a fraction.
pub fn julian_day(dt: DateTime<Utc>) -> f64 {
    let hours = f64::from(dt.hour())
        + f64::from(dt.minute()) / 60.0
        + (f64::from(dt.second()) + f64::from(dt.nanosecond()) / 1e9) / 3600.0;
    let day = f64::from(dt.day()) + hours / 24.0;

    let (mut year, mut month) = (dt.year(), dt.month() as i32);
    if month <= 2 {
        year -= 1;
        month += 12;
    }
    let a = (f64::from(year) / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * f64::from(year + 4716)).floor() + (30.6001 * f64::from(month + 1)).floor() + day + b
        - 1524.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn julian_day_reference_epochs() {
        assert!((julian_day(utc(2000, 1, 1, 12, 0, 0)) - 2_451_545.0).abs() < 1e-9);
        assert!((julian_day(utc(2000, 1, 1, 0, 0, 0)) - 2_451_544.5).abs() < 1e-9);
        // Sputnik 1 launch, Meeus example 7.a
        assert!((julian_day(utc(1957, 10, 4, 19, 26, 24)) - 2_436_116.31).abs() < 1e-6);
    }

    #[test]
    fn india_standard_time_is_five_and_a_half_hours_ahead() {
        let d = NaiveDate::from_ymd_opt(1999, 8, 14).unwrap();
        let t = NaiveTime::from_hms_opt(6, 30, 0).unwrap();
        assert_eq!(local_to_utc(d, t, chrono_tz::Asia::Kolkata), utc(1999, 8, 14, 1, 0, 0));
    }

    #[test]
    fn ambiguous_fall_back_time_takes_earliest_instant() {
        // 2021-11-07 01:30 happens twice in New York; the first one is EDT (UTC-4)
        let d = NaiveDate::from_ymd_opt(2021, 11, 7).unwrap();
        let t = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        assert_eq!(local_to_utc(d, t, chrono_tz::America::New_York), utc(2021, 11, 7, 5, 30, 0));
    }

    #[test]
    fn spring_forward_gap_uses_pre_gap_offset() {
        // 2021-03-14 02:30 does not exist in New York; EST (UTC-5) applies
        let d = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        let t = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        assert_eq!(local_to_utc(d, t, chrono_tz::America::New_York), utc(2021, 3, 14, 7, 30, 0));
    }

    #[test]
    fn static_lookup_answers_everywhere() {
        let lookup = StaticTimezoneLookup(Some(chrono_tz::UTC));
        assert_eq!(lookup.zone_at(89.0, -179.0), Some(chrono_tz::UTC));
        assert_eq!(StaticTimezoneLookup(None).zone_at(0.0, 0.0), None);
    }
}
