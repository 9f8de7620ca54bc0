//! Time utilities for import timezones, offsets and XMLTV timestamps
//!
//! Programme times are kept as broadcast-local wall-clock values
//! (`NaiveDateTime`) because the midnight combiner reasons about local
//! day boundaries. Import files carry UTC offsets which are converted into
//! the configured timezone here.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;
use regex::Regex;

use crate::errors::{AppError, AppResult, SourceError, SourceResult};

/// Timezone that imported timestamps are converted into
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceTimezone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl SourceTimezone {
    /// Parse a named timezone (`Europe/London`) or a UTC offset (`+01:00`, `+0100`)
    pub fn parse(value: &str) -> AppResult<Self> {
        let value = value.trim();
        if let Ok(tz) = value.parse::<Tz>() {
            return Ok(Self::Named(tz));
        }
        parse_fixed_offset(value).map(Self::Fixed).ok_or_else(|| {
            AppError::configuration(format!(
                "Invalid timezone: '{value}'. Use either a named timezone (e.g., 'Europe/London') or UTC offset (e.g., '+01:00')"
            ))
        })
    }

    /// Wall-clock time of `instant` in this timezone
    pub fn local_time(&self, instant: &DateTime<FixedOffset>) -> NaiveDateTime {
        match self {
            Self::Named(tz) => instant.with_timezone(tz).naive_local(),
            Self::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

impl Default for SourceTimezone {
    fn default() -> Self {
        Self::Named(chrono_tz::UTC)
    }
}

/// Parse a time offset string like "+1h30m", "-45m", "+5s", "0"
pub fn parse_time_offset(offset_str: &str) -> AppResult<Duration> {
    let offset_str = offset_str.trim();

    if offset_str == "0" || offset_str.is_empty() {
        return Ok(Duration::zero());
    }

    let re = Regex::new(r"^([+-]?)(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$")
        .map_err(|e| AppError::configuration(format!("Invalid regex: {e}")))?;

    let caps = re.captures(offset_str).ok_or_else(|| {
        AppError::configuration(format!(
            "Invalid time offset format: '{offset_str}'. Expected format like '+1h30m', '-45m', '+5s', or '0'"
        ))
    })?;

    let component = |index: usize| -> i64 {
        caps.get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (component(2), component(3), component(4));

    if hours > 23 {
        return Err(AppError::configuration(format!(
            "Hour offset too large: {hours}h. Maximum allowed is 23h"
        )));
    }
    if minutes > 59 || seconds > 59 {
        return Err(AppError::configuration(format!(
            "Minute/second offset out of range in '{offset_str}'"
        )));
    }

    let total = Duration::seconds(hours * 3600 + minutes * 60 + seconds);
    match caps.get(1).map(|m| m.as_str()) {
        Some("-") => Ok(-total),
        _ => Ok(total),
    }
}

/// Parse fixed offset timezone formats like "+01:00", "-0530"
pub fn parse_fixed_offset(offset_str: &str) -> Option<FixedOffset> {
    let offset_str = offset_str.trim();
    let (sign, rest) = match offset_str.as_bytes().first()? {
        b'+' => (1, &offset_str[1..]),
        b'-' => (-1, &offset_str[1..]),
        _ => return None,
    };

    let digits = match rest.split_once(':') {
        Some((h, m)) if h.len() == 2 && m.len() == 2 => format!("{h}{m}"),
        Some(_) => return None,
        None => rest.to_string(),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse an XMLTV timestamp (`20231215120000 +0100`) into local time of `zone`.
///
/// Timestamps without an offset are taken to already be in the source's
/// local time. Truncated `YYYYmmddHHMM` values are accepted.
pub fn parse_xmltv_timestamp(value: &str, zone: &SourceTimezone) -> SourceResult<NaiveDateTime> {
    let mut parts = value.split_whitespace();
    let stamp = parts
        .next()
        .ok_or_else(|| SourceError::invalid_timestamp(value, "empty timestamp"))?;

    let format = match stamp.len() {
        14 => "%Y%m%d%H%M%S",
        12 => "%Y%m%d%H%M",
        _ => {
            return Err(SourceError::invalid_timestamp(
                value,
                "expected YYYYmmddHHMMSS",
            ))
        }
    };
    let naive = NaiveDateTime::parse_from_str(stamp, format)
        .map_err(|e| SourceError::invalid_timestamp(value, e.to_string()))?;

    let Some(offset_str) = parts.next() else {
        return Ok(naive);
    };
    let offset = parse_fixed_offset(offset_str)
        .ok_or_else(|| SourceError::invalid_timestamp(value, "invalid UTC offset"))?;
    let instant = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| SourceError::invalid_timestamp(value, "unrepresentable local time"))?;

    Ok(zone.local_time(&instant))
}

/// True when the wall-clock time is exactly 00:00:00
pub fn is_midnight(time: &NaiveDateTime) -> bool {
    time.hour() == 0 && time.minute() == 0 && time.second() == 0
}
