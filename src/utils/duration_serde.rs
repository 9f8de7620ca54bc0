//! Serde helpers for programme durations.
//!
//! Durations are written as human-readable strings (`"1h 30m"`) and read back
//! from either that form or a plain number of seconds.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

use chrono::Duration;

/// Longest programme duration accepted when reading, in seconds (one week)
pub const MAX_DURATION_SECONDS: i64 = 7 * 24 * 60 * 60;

fn bounded<E: de::Error>(seconds: i64) -> Result<Duration, E> {
    if !(-MAX_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&seconds) {
        return Err(de::Error::custom(format!(
            "Duration out of range: {seconds}s exceeds {MAX_DURATION_SECONDS}s"
        )));
    }
    Duration::try_seconds(seconds)
        .ok_or_else(|| de::Error::custom(format!("Duration out of range: {seconds}s")))
}

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match duration.to_std() {
        Ok(std_duration) => {
            let duration_str = humantime::format_duration(std_duration).to_string();
            serializer.serialize_str(&duration_str)
        }
        // negative durations have no humantime form
        Err(_) => serializer.serialize_i64(duration.num_seconds()),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a duration as seconds (number) or human-readable string (e.g., '30m', '1h 30m')")
        }

        fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let seconds = i64::try_from(seconds)
                .map_err(|_| de::Error::custom(format!("Duration too large: {seconds}s")))?;
            bounded(seconds)
        }

        fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            bounded(seconds)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let parsed = humantime::parse_duration(value)
                .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))?;
            let seconds = i64::try_from(parsed.as_secs())
                .map_err(|_| de::Error::custom(format!("Duration out of range '{value}'")))?;
            bounded::<E>(seconds)?;
            Duration::from_std(parsed)
                .map_err(|e| de::Error::custom(format!("Duration out of range '{value}': {e}")))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}
