use super::ephemeris::{AnalyticEphemeris, Ephemeris, EphemerisError};
use super::time::{julian_day, local_to_utc, TimezoneLookup, TzfTimezoneLookup};
use super::zodiac::ZodiacSign;
use crate::error::{AstroError, AstroResult};
use crate::location::ResolvedLocation;
use crate::personality::TRAITS_PLACEHOLDER;
use crate::validation::BirthQuery;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Signs plus the raw positions they were binned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    pub sun_sign: ZodiacSign,
    pub moon_sign: ZodiacSign,
    pub ascendant: ZodiacSign,
    pub traits: String,
    pub sun_longitude: f64,
    pub moon_longitude: f64,
    pub ascendant_longitude: f64,
    pub julian_day: f64,
}

impl ChartResult {
    pub fn with_traits(self, traits: impl Into<String>) -> Self {
        Self {
            traits: traits.into(),
            ..self
        }
    }
}

impl From<EphemerisError> for AstroError {
    fn from(err: EphemerisError) -> Self {
        AstroError::CalculationFailed(err.to_string())
    }
}

pub struct ChartCalculator {
    timezones: Arc<dyn TimezoneLookup>,
    ephemeris: Arc<dyn Ephemeris>,
}

impl ChartCalculator {
    pub fn new(timezones: Arc<dyn TimezoneLookup>, ephemeris: Arc<dyn Ephemeris>) -> Self {
        Self {
            timezones,
            ephemeris,
        }
    }

    pub fn ephemeris_name(&self) -> &'static str {
        self.ephemeris.name()
    }

    /// Sun, Moon and ascendant signs for a validated query at a resolved location.
    /// `traits` is left as the placeholder; scoring happens separately.
    pub fn compute(&self, query: &BirthQuery, location: &ResolvedLocation) -> AstroResult<ChartResult> {
        let (lat, lon) = (location.latitude, location.longitude);
        let tz = self
            .timezones
            .zone_at(lat, lon)
            .ok_or(AstroError::TimezoneNotFound { lat, lon })?;

        let utc = local_to_utc(query.date, query.time, tz);
        let jd = julian_day(utc);
        if !jd.is_finite() {
            return Err(AstroError::CalculationFailed(format!("invalid Julian day for {utc}")));
        }

        let sun = self.ephemeris.sun_longitude(jd)?;
        let moon = self.ephemeris.moon_longitude(jd)?;
        let asc = self.ephemeris.ascendant(jd, lat, lon)?;
        for (body, value) in [("sun", sun), ("moon", moon), ("ascendant", asc)] {
            if !value.is_finite() {
                return Err(AstroError::CalculationFailed(format!(
                    "{} returned a non-finite {body} longitude",
                    self.ephemeris.name()
                )));
            }
        }

        tracing::debug!(
            target: "zodiac::chart",
            %tz,
            %utc,
            jd,
            sun,
            moon,
            asc,
            backend = self.ephemeris.name(),
            "chart computed"
        );

        Ok(ChartResult {
            sun_sign: ZodiacSign::from_longitude(sun),
            moon_sign: ZodiacSign::from_longitude(moon),
            ascendant: ZodiacSign::from_longitude(asc),
            traits: TRAITS_PLACEHOLDER.to_string(),
            sun_longitude: sun,
            moon_longitude: moon,
            ascendant_longitude: asc,
            julian_day: jd,
        })
    }
}

impl Default for ChartCalculator {
    /// tzf-rs zone lookup with the analytic ephemeris.
    fn default() -> Self {
        Self::new(Arc::new(TzfTimezoneLookup::new()), Arc::new(AnalyticEphemeris))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::StaticTimezoneLookup;
    use crate::location::LocationSource;
    use chrono::{NaiveDate, NaiveTime};

    struct BrokenEphemeris;

    impl Ephemeris for BrokenEphemeris {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn sun_longitude(&self, _jd: f64) -> Result<f64, EphemerisError> {
            Ok(f64::NAN)
        }
        fn moon_longitude(&self, _jd: f64) -> Result<f64, EphemerisError> {
            Ok(0.0)
        }
        fn ascendant(&self, _jd: f64, _lat: f64, _lon: f64) -> Result<f64, EphemerisError> {
            Err(EphemerisError::HouseCalculationFailed {
                message: "no houses".into(),
            })
        }
    }

    fn query() -> BirthQuery {
        BirthQuery {
            name: "Ravi".into(),
            date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            place: "london".into(),
        }
    }

    fn london() -> ResolvedLocation {
        ResolvedLocation::new(51.5074, -0.1278, LocationSource::CommonCity)
    }

    #[test]
    fn utc_noon_j2000_gives_capricorn_sun_and_scorpio_moon() {
        let calc = ChartCalculator::new(
            Arc::new(StaticTimezoneLookup(Some(chrono_tz::UTC))),
            Arc::new(AnalyticEphemeris),
        );
        let chart = calc.compute(&query(), &london()).unwrap();
        assert!((chart.julian_day - 2_451_545.0).abs() < 1e-9);
        assert_eq!(chart.sun_sign, ZodiacSign::Capricorn);
        assert_eq!(chart.moon_sign, ZodiacSign::Scorpio);
        assert_eq!(chart.traits, TRAITS_PLACEHOLDER);
        assert!((0.0..360.0).contains(&chart.ascendant_longitude));
    }

    #[test]
    fn missing_zone_is_reported_with_coordinates() {
        let calc = ChartCalculator::new(Arc::new(StaticTimezoneLookup(None)), Arc::new(AnalyticEphemeris));
        let err = calc.compute(&query(), &london()).unwrap_err();
        assert_eq!(err.kind(), "timezone_not_found");
    }

    #[test]
    fn non_finite_positions_are_calculation_failures() {
        let calc = ChartCalculator::new(
            Arc::new(StaticTimezoneLookup(Some(chrono_tz::UTC))),
            Arc::new(BrokenEphemeris),
        );
        let err = calc.compute(&query(), &london()).unwrap_err();
        assert!(matches!(err, AstroError::CalculationFailed(_)));
    }

    #[test]
    fn with_traits_replaces_placeholder() {
        let calc = ChartCalculator::new(
            Arc::new(StaticTimezoneLookup(Some(chrono_tz::UTC))),
            Arc::new(AnalyticEphemeris),
        );
        let chart = calc.compute(&query(), &london()).unwrap().with_traits("Luck: 1.00");
        assert_eq!(chart.traits, "Luck: 1.00");
    }
}
