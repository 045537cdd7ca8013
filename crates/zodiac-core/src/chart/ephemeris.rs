//! Ephemeris backends: ecliptic longitudes of the Sun, the Moon and the ascendant.

use thiserror::Error;

/// Errors that can occur during ephemeris calculations
#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("Ephemeris data not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },

    #[error("Failed to calculate position for {body} at JD {julian_day}: {message}")]
    CalculationFailed {
        body: &'static str,
        julian_day: f64,
        message: String,
    },

    #[error("House calculation failed: {message}")]
    HouseCalculationFailed { message: String },

    #[error("Failed to fetch ephemeris file {file}: {message}")]
    Download { file: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tropical, geocentric longitudes in degrees, `[0, 360)`.
pub trait Ephemeris: Send + Sync {
    fn name(&self) -> &'static str;

    fn sun_longitude(&self, julian_day: f64) -> Result<f64, EphemerisError>;

    fn moon_longitude(&self, julian_day: f64) -> Result<f64, EphemerisError>;

    /// Ecliptic longitude rising on the eastern horizon for an observer at
    /// `latitude`/`longitude` (east positive).
    fn ascendant(&self, julian_day: f64, latitude: f64, longitude: f64) -> Result<f64, EphemerisError>;
}

const J2000: f64 = 2_451_545.0;

fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000) / 36_525.0
}

fn normalize(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

fn finite(body: &'static str, jd: f64, value: f64) -> Result<f64, EphemerisError> {
    if value.is_finite() {
        Ok(normalize(value))
    } else {
        Err(EphemerisError::CalculationFailed {
            body,
            julian_day: jd,
            message: "result is not a finite number".to_string(),
        })
    }
}

/// Closed-form low-precision theory (Meeus, Astronomical Algorithms ch. 12, 22, 25, 47).
///
/// Sun within ~0.01°, Moon within ~0.3°, no data files required.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEphemeris;

impl AnalyticEphemeris {
    /// Mean obliquity of the ecliptic in degrees.
    fn obliquity(t: f64) -> f64 {
        23.439_291_1 - 0.013_004_2 * t - 1.64e-7 * t * t + 5.04e-7 * t * t * t
    }

    /// Greenwich mean sidereal time in degrees.
    fn sidereal_time(jd: f64) -> f64 {
        let t = centuries_since_j2000(jd);
        normalize(
            280.460_618_37 + 360.985_647_366_29 * (jd - J2000) + 0.000_387_933 * t * t
                - t * t * t / 38_710_000.0,
        )
    }
}

impl Ephemeris for AnalyticEphemeris {
    fn name(&self) -> &'static str {
        "analytic"
    }

    fn sun_longitude(&self, jd: f64) -> Result<f64, EphemerisError> {
        let t = centuries_since_j2000(jd);
        let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
        let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t).to_radians();
        let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
            + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
            + 0.000_289 * (3.0 * m).sin();
        let omega = (125.04 - 1_934.136 * t).to_radians();
        let apparent = l0 + c - 0.005_69 - 0.004_78 * omega.sin();
        finite("sun", jd, apparent)
    }

    fn moon_longitude(&self, jd: f64) -> Result<f64, EphemerisError> {
        let t = centuries_since_j2000(jd);
        let lp = 218.316_447_7 + 481_267.881_234_21 * t;
        let d = (297.850_192_1 + 445_267.111_403_4 * t).to_radians();
        let m = (357.529_109_2 + 35_999.050_290_9 * t).to_radians();
        let mp = (134.963_396_4 + 477_198.867_505_5 * t).to_radians();
        let f = (93.272_095_0 + 483_202.017_523_3 * t).to_radians();

        // largest periodic terms of the lunar longitude, degrees
        let terms: [(f64, f64); 20] = [
            (6.288_774, mp),
            (1.274_027, 2.0 * d - mp),
            (0.658_314, 2.0 * d),
            (0.213_618, 2.0 * mp),
            (-0.185_116, m),
            (-0.114_332, 2.0 * f),
            (0.058_793, 2.0 * d - 2.0 * mp),
            (0.057_066, 2.0 * d - m - mp),
            (0.053_322, 2.0 * d + mp),
            (0.045_758, 2.0 * d - m),
            (-0.040_923, m - mp),
            (-0.034_720, d),
            (-0.030_383, m + mp),
            (0.015_327, 2.0 * d - 2.0 * f),
            (-0.012_528, mp + 2.0 * f),
            (0.010_980, mp - 2.0 * f),
            (0.010_675, 4.0 * d - mp),
            (0.010_034, 3.0 * mp),
            (0.008_548, 4.0 * d - 2.0 * mp),
            (-0.007_888, 2.0 * d + m - mp),
        ];
        let periodic: f64 = terms.iter().map(|(amp, arg)| amp * arg.sin()).sum();
        finite("moon", jd, lp + periodic)
    }

    fn ascendant(&self, jd: f64, latitude: f64, longitude: f64) -> Result<f64, EphemerisError> {
        if !(-90.0..=90.0).contains(&latitude) || latitude.abs() >= 89.999 {
            return Err(EphemerisError::HouseCalculationFailed {
                message: format!("ascendant undefined at latitude {latitude}"),
            });
        }
        let t = centuries_since_j2000(jd);
        let eps = Self::obliquity(t).to_radians();
        let ramc = (Self::sidereal_time(jd) + longitude).to_radians();
        let phi = latitude.to_radians();

        let y = ramc.cos();
        let x = -(ramc.sin() * eps.cos() + phi.tan() * eps.sin());
        finite("ascendant", jd, y.atan2(x).to_degrees())
    }
}

/// Swiss Ephemeris through the `swisseph` crate; ascendant from Placidus houses.
///
/// The data directory is process-wide library state, set once by [`SwissEphemeris::new`].
#[cfg(feature = "swiss-ephemeris")]
#[derive(Debug)]
#[non_exhaustive]
pub struct SwissEphemeris;

#[cfg(feature = "swiss-ephemeris")]
mod swiss {
    use super::{normalize, EphemerisError, SwissEphemeris};
    use std::path::Path;
    use swisseph::swe::{calc_ut, houses_ex, set_ephe_path};

    const SUN: u32 = 0;
    const MOON: u32 = 1;
    /// FLG_SWIEPH: read the Swiss Ephemeris data files
    const FLG_SWIEPH: u32 = 2;
    const PLACIDUS: u8 = b'P';

    impl SwissEphemeris {
        /// Points the library at `ephemeris_path`, which must be an existing UTF-8 directory.
        pub fn new(ephemeris_path: &Path) -> Result<Self, EphemerisError> {
            let dir = data_dir(ephemeris_path)?;
            set_ephe_path(dir);
            tracing::info!(target: "zodiac::chart", path = dir, "swiss ephemeris data path set");
            Ok(Self)
        }

        fn body_longitude(&self, body: &'static str, code: u32, jd: f64) -> Result<f64, EphemerisError> {
            let result = calc_ut(jd, code, FLG_SWIEPH).map_err(|e| EphemerisError::CalculationFailed {
                body,
                julian_day: jd,
                message: format!("Swiss Ephemeris error: {}", e),
            })?;
            super::finite(body, jd, result.out[0])
        }
    }

    impl super::Ephemeris for SwissEphemeris {
        fn name(&self) -> &'static str {
            "swiss"
        }

        fn sun_longitude(&self, jd: f64) -> Result<f64, EphemerisError> {
            self.body_longitude("sun", SUN, jd)
        }

        fn moon_longitude(&self, jd: f64) -> Result<f64, EphemerisError> {
            self.body_longitude("moon", MOON, jd)
        }

        fn ascendant(&self, jd: f64, latitude: f64, longitude: f64) -> Result<f64, EphemerisError> {
            let (_cusps, ascmc) = houses_ex(jd, FLG_SWIEPH as i32, latitude, longitude, PLACIDUS as i32);
            let asc = swisseph::AscMc::from_array(ascmc).ascendant;
            if !asc.is_finite() {
                return Err(EphemerisError::HouseCalculationFailed {
                    message: format!("no ascendant for latitude {latitude}"),
                });
            }
            Ok(normalize(asc))
        }
    }

    fn data_dir(path: &Path) -> Result<&str, EphemerisError> {
        if !path.is_dir() {
            return Err(EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Ephemeris directory does not exist.".to_string(),
            });
        }
        path.to_str().ok_or_else(|| EphemerisError::FileNotFound {
            path: path.display().to_string(),
            message: "Ephemeris directory is not valid UTF-8.".to_string(),
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn data_dir_must_exist() {
            let dir = tempfile::tempdir().unwrap();
            assert_eq!(data_dir(dir.path()).unwrap(), dir.path().to_str().unwrap());

            let missing = dir.path().join("ephe");
            assert!(matches!(data_dir(&missing), Err(EphemerisError::FileNotFound { .. })));
            assert!(matches!(SwissEphemeris::new(&missing), Err(EphemerisError::FileNotFound { .. })));
        }

        #[test]
        fn a_file_is_not_a_data_dir() {
            let file = tempfile::NamedTempFile::new().unwrap();
            assert!(matches!(data_dir(file.path()), Err(EphemerisError::FileNotFound { .. })));
        }
    }
}
