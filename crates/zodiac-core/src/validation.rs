//! Input Validator: presence and format checks for `/process` bodies.

use crate::error::{AstroError, AstroResult};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Raw `/process` body. Every field is optional so that missing ones can be reported together.
/// The short names (`date`, `time`, `place`) used by older clients are accepted as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BirthDetailsRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "date")]
    pub birth_date: Option<String>,
    #[serde(default, alias = "time")]
    pub birth_time: Option<String>,
    #[serde(default, alias = "place")]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Validated birth details.
#[derive(Debug, Clone, PartialEq)]
pub struct BirthQuery {
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub place: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Checks all four fields, reporting every missing one before looking at formats.
pub fn validate(req: &BirthDetailsRequest) -> AstroResult<BirthQuery> {
    let fields = [
        ("name", present(&req.name)),
        ("birth_date", present(&req.birth_date)),
        ("birth_time", present(&req.birth_time)),
        ("birth_place", present(&req.birth_place)),
    ];
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| k.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AstroError::MissingFields(missing));
    }

    let [(_, Some(name)), (_, Some(date)), (_, Some(time)), (_, Some(place))] = fields else {
        return Err(AstroError::Internal("validated field vanished".to_string()));
    };

    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| AstroError::InvalidFormat {
        field: "birth_date",
        value: date.to_string(),
        expected: "YYYY-MM-DD",
    })?;
    let time = NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(|_| AstroError::InvalidFormat {
        field: "birth_time",
        value: time.to_string(),
        expected: "HH:MM (24-hour)",
    })?;

    Ok(BirthQuery {
        name: name.to_string(),
        date,
        time,
        place: place.to_string(),
    })
}
