//! Chart Calculator: birth moment and place → Sun, Moon and ascendant signs.

mod calculator;
mod ephemeris;
mod files;
mod time;
mod zodiac;

pub use calculator::{ChartCalculator, ChartResult};
#[cfg(feature = "swiss-ephemeris")]
pub use ephemeris::SwissEphemeris;
pub use ephemeris::{AnalyticEphemeris, Ephemeris, EphemerisError};
pub use files::{ensure_ephemeris_files, EPHEMERIS_FILES};
pub use time::{julian_day, local_to_utc, StaticTimezoneLookup, TimezoneLookup, TzfTimezoneLookup};
pub use zodiac::ZodiacSign;
