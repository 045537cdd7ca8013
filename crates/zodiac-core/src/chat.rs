//! Chat Responder: keyword categories over a tokenized message, answered from the stored chart.

use crate::chart::ZodiacSign;
use crate::error::{AstroError, AstroResult};
use crate::session::SessionChart;

/// Sign used for every answer when the session has no chart yet.
pub const DEFAULT_SIGN: ZodiacSign = ZodiacSign::Aries;

const FALLBACK: &str = "Please ask about horoscope, love, career, or dosha.";

/// Lowercased words; anything other than alphanumerics and `'` separates tokens.
pub fn tokenize(message: &str) -> Vec<String> {
    message
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Horoscope,
    Love,
    Career,
    Dosha,
}

impl Topic {
    const ORDERED: [Topic; 4] = [Topic::Horoscope, Topic::Love, Topic::Career, Topic::Dosha];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Topic::Horoscope => &["horoscope", "day"],
            Topic::Love => &["love", "relationship", "compatibility"],
            Topic::Career => &["career", "job", "work"],
            Topic::Dosha => &["mangal", "dosha"],
        }
    }

    fn reply(self, sun: ZodiacSign, moon: ZodiacSign) -> String {
        match self {
            Topic::Horoscope => format!("Your daily horoscope: {}", sun.daily_horoscope()),
            Topic::Love => format!("Love advice: Follow your {moon} intuition."),
            Topic::Career => format!("Career tip: Leverage your {sun} strengths."),
            Topic::Dosha => "Consult an astrologer for remedies.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatResponder;

impl ChatResponder {
    pub fn new() -> Self {
        Self
    }

    /// Canned reply for `message`, using the session's chart or [`DEFAULT_SIGN`].
    pub fn respond(&self, message: &str, chart: Option<&SessionChart>) -> AstroResult<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AstroError::MissingFields(vec!["message".to_string()]));
        }

        let tokens = tokenize(message);
        let (sun, moon) = chart
            .map(|c| (c.sun_sign, c.moon_sign))
            .unwrap_or((DEFAULT_SIGN, DEFAULT_SIGN));

        let segments: Vec<String> = Topic::ORDERED
            .iter()
            .filter(|topic| topic.keywords().iter().any(|k| tokens.iter().any(|t| t == k)))
            .map(|topic| topic.reply(sun, moon))
            .collect();

        tracing::debug!(target: "zodiac::chat", ?tokens, matched = segments.len(), has_chart = chart.is_some(), "chat message");

        if segments.is_empty() {
            return Ok(format!("I heard \"{message}\". {FALLBACK}"));
        }
        Ok(segments.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn chart(sun: ZodiacSign, moon: ZodiacSign) -> SessionChart {
        SessionChart {
            name: "Meera".into(),
            sun_sign: sun,
            moon_sign: moon,
            ascendant: ZodiacSign::Virgo,
            traits: String::new(),
            birth_date: NaiveDate::from_ymd_opt(1995, 7, 2).unwrap(),
            birth_time: NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
        }
    }

    #[test]
    fn tokenizer_splits_on_punctuation() {
        assert_eq!(tokenize("Love, career?  WORK!"), vec!["love", "career", "work"]);
        assert_eq!(tokenize("what's my day"), vec!["what's", "my", "day"]);
    }

    #[test]
    fn categories_contribute_in_fixed_order() {
        let c = chart(ZodiacSign::Leo, ZodiacSign::Pisces);
        let reply = ChatResponder.respond("any dosha? my job and love life today", Some(&c)).unwrap();
        assert_eq!(
            reply,
            "Love advice: Follow your Pisces intuition. \
             Career tip: Leverage your Leo strengths. \
             Consult an astrologer for remedies."
        );
    }

    #[test]
    fn horoscope_uses_sun_sign_text() {
        let c = chart(ZodiacSign::Capricorn, ZodiacSign::Aries);
        let reply = ChatResponder.respond("What about my day?", Some(&c)).unwrap();
        assert_eq!(reply, "Your daily horoscope: Hard work pays off in your career.");
    }

    #[test]
    fn keywords_match_whole_tokens_only() {
        let reply = ChatResponder.respond("lovely daylight", None).unwrap();
        assert!(reply.starts_with("I heard \"lovely daylight\"."));
    }

    #[test]
    fn no_chart_defaults_to_aries() {
        let reply = ChatResponder.respond("career", None).unwrap();
        assert_eq!(reply, "Career tip: Leverage your Aries strengths.");
    }

    #[test]
    fn blank_message_is_missing_field() {
        let err = ChatResponder.respond("   ", None).unwrap_err();
        assert_eq!(err, AstroError::MissingFields(vec!["message".into()]));
    }
}
