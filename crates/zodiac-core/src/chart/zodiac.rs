use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve 30° ecliptic bins, in order from 0° longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];

    /// `floor(longitude / 30) mod 12`, after wrapping the longitude into `[0, 360)`.
    pub fn from_longitude(longitude: f64) -> Self {
        let lon = longitude.rem_euclid(360.0);
        let idx = (lon / 30.0).floor() as usize % 12;
        Self::ALL[idx]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }

    /// One-line daily horoscope used by the chat responder.
    pub fn daily_horoscope(&self) -> &'static str {
        match self {
            Self::Aries => "Today is a great day for bold actions!",
            Self::Taurus => "Stability will guide your decisions today.",
            Self::Gemini => "Communication is your strength today.",
            Self::Cancer => "Trust your intuition in emotional matters.",
            Self::Leo => "Your confidence shines brightly today.",
            Self::Virgo => "Focus on details to achieve success.",
            Self::Libra => "Balance is key in your relationships today.",
            Self::Scorpio => "Embrace transformation and inner strength.",
            Self::Sagittarius => "Adventure awaits you today.",
            Self::Capricorn => "Hard work pays off in your career.",
            Self::Aquarius => "Innovate and think outside the box.",
            Self::Pisces => "Your creativity flows effortlessly today.",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
