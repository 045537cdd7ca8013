//! Trait Scorer: five decorative personality scores derived from the birth moment.

use crate::error::{AstroError, AstroResult};
use crate::validation::BirthQuery;
use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown in place of scores when scoring fails; the chart itself is still returned.
pub const TRAITS_PLACEHOLDER: &str = "Trait scores unavailable";

pub const TRAIT_NAMES: [&str; 5] = ["Confidence", "Luck", "Creativity", "Health", "Love"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitScores {
    pub confidence: f64,
    pub luck: f64,
    pub creativity: f64,
    pub health: f64,
    pub love: f64,
}

impl TraitScores {
    pub fn from_array(values: [f64; 5]) -> Self {
        let [confidence, luck, creativity, health, love] = values;
        Self {
            confidence,
            luck,
            creativity,
            health,
            love,
        }
    }

    pub fn to_array(&self) -> [f64; 5] {
        [self.confidence, self.luck, self.creativity, self.health, self.love]
    }

    fn check(self) -> AstroResult<Self> {
        for (name, value) in TRAIT_NAMES.iter().zip(self.to_array()) {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AstroError::TraitScoring(format!("{name} score {value} outside [0, 1]")));
            }
        }
        Ok(self)
    }
}

impl fmt::Display for TraitScores {
    /// `Confidence: 0.80, Luck: 0.70, ...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in TRAIT_NAMES.iter().zip(self.to_array()).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value:.2}")?;
        }
        Ok(())
    }
}

pub trait TraitScorer: Send + Sync {
    fn score(&self, query: &BirthQuery) -> AstroResult<TraitScores>;
}

/// The same five numbers for everyone.
#[derive(Debug, Clone, Copy)]
pub struct FixedTraitScorer(pub TraitScores);

impl Default for FixedTraitScorer {
    fn default() -> Self {
        Self(TraitScores::from_array([0.80, 0.70, 0.65, 0.75, 0.85]))
    }
}

impl TraitScorer for FixedTraitScorer {
    fn score(&self, _query: &BirthQuery) -> AstroResult<TraitScores> {
        self.0.check()
    }
}

/// One logistic unit per trait over `(day/31, month/12, (year mod 100)/100, hour/23)`.
#[derive(Debug, Clone)]
pub struct RegressionTraitScorer {
    weights: [[f64; 4]; 5],
    bias: [f64; 5],
}

impl RegressionTraitScorer {
    pub fn new(weights: [[f64; 4]; 5], bias: [f64; 5]) -> Self {
        Self { weights, bias }
    }

    fn features(query: &BirthQuery) -> [f64; 4] {
        [
            f64::from(query.date.day()) / 31.0,
            f64::from(query.date.month()) / 12.0,
            f64::from(query.date.year().rem_euclid(100)) / 100.0,
            f64::from(query.time.hour()) / 23.0,
        ]
    }
}

impl Default for RegressionTraitScorer {
    fn default() -> Self {
        Self::new(
            [
                [0.42, -0.31, 0.18, 0.55],
                [-0.27, 0.64, -0.12, 0.21],
                [0.36, 0.15, 0.47, -0.38],
                [-0.19, 0.28, -0.41, 0.33],
                [0.51, -0.22, 0.26, 0.17],
            ],
            [0.95, 0.55, 0.40, 0.80, 1.10],
        )
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl TraitScorer for RegressionTraitScorer {
    fn score(&self, query: &BirthQuery) -> AstroResult<TraitScores> {
        let x = Self::features(query);
        let mut out = [0.0; 5];
        for (slot, (row, bias)) in out.iter_mut().zip(self.weights.iter().zip(self.bias)) {
            let z: f64 = row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + bias;
            *slot = sigmoid(z);
        }
        TraitScores::from_array(out).check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn query(y: i32, m: u32, d: u32, h: u32) -> BirthQuery {
        BirthQuery {
            name: "Asha".into(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            time: NaiveTime::from_hms_opt(h, 15, 0).unwrap(),
            place: "chennai".into(),
        }
    }

    #[test]
    fn fixed_scores_use_two_decimals_in_fixed_order() {
        let scores = FixedTraitScorer::default().score(&query(1990, 5, 5, 5)).unwrap();
        assert_eq!(
            scores.to_string(),
            "Confidence: 0.80, Luck: 0.70, Creativity: 0.65, Health: 0.75, Love: 0.85"
        );
    }

    #[test]
    fn regression_is_reproducible_and_bounded() {
        let scorer = RegressionTraitScorer::default();
        let a = scorer.score(&query(1987, 11, 23, 22)).unwrap();
        let b = scorer.score(&query(1987, 11, 23, 22)).unwrap();
        assert_eq!(a, b);
        for v in a.to_array() {
            assert!(v > 0.0 && v < 1.0);
        }
    }

    #[test]
    fn regression_depends_on_birth_moment() {
        let scorer = RegressionTraitScorer::default();
        let a = scorer.score(&query(1987, 1, 1, 0)).unwrap();
        let b = scorer.score(&query(2012, 12, 31, 23)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn non_finite_weights_are_scoring_errors() {
        let scorer = RegressionTraitScorer::new([[f64::NAN; 4]; 5], [0.0; 5]);
        let err = scorer.score(&query(2001, 2, 3, 4)).unwrap_err();
        assert_eq!(err.kind(), "trait_scoring_failed");
    }
}
