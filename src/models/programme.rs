//! Programme entries: one schedule record per broadcast slot

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::is_midnight;

/// Ordered programme list owned by a station, ascending by start time
pub type EpgCollection = Vec<ProgrammeEntry>;

/// People credited on a programme, one ordered list per role
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credits {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub producers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cast: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub writers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guest_stars: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presenters: Vec<String>,
}

impl Credits {
    pub fn is_empty(&self) -> bool {
        self.directors.is_empty()
            && self.producers.is_empty()
            && self.cast.is_empty()
            && self.writers.is_empty()
            && self.guest_stars.is_empty()
            && self.presenters.is_empty()
    }
}

/// A single programme in a channel's schedule.
///
/// `start` is broadcast-local wall-clock time. Within one station's
/// [`EpgCollection`] no two entries share a start time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgrammeEntry {
    pub start: NaiveDateTime,
    #[serde(with = "crate::utils::duration_serde")]
    pub duration: Duration,
    pub event_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parental_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parental_rating_system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_play_date: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,

    /// Production date, usually a year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    #[serde(default, skip_serializing_if = "Credits::is_empty")]
    pub credits: Credits,

    /// Suppresses external metadata lookup for this entry
    #[serde(default)]
    pub no_lookup: bool,
}

impl ProgrammeEntry {
    pub fn new(start: NaiveDateTime, duration: Duration, event_name: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            event_name: event_name.into(),
            short_description: None,
            extended_description: None,
            subtitle: None,
            event_category: None,
            parental_rating: None,
            parental_rating_system: None,
            video_quality: None,
            aspect_ratio: None,
            audio_quality: None,
            subtitles: None,
            star_rating: None,
            previous_play_date: None,
            series_id: None,
            episode_id: None,
            part_number: None,
            season_number: None,
            episode_number: None,
            date: None,
            country: None,
            language_code: None,
            credits: Credits::default(),
            no_lookup: false,
        }
    }

    /// Instant the programme finishes (start + duration), saturating at the
    /// limits of the calendar
    pub fn end(&self) -> NaiveDateTime {
        self.start
            .checked_add_signed(self.duration)
            .unwrap_or(if self.duration < Duration::zero() {
                NaiveDateTime::MIN
            } else {
                NaiveDateTime::MAX
            })
    }

    pub fn starts_at_midnight(&self) -> bool {
        is_midnight(&self.start)
    }

    pub fn ends_at_midnight(&self) -> bool {
        is_midnight(&self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_midnight_properties() {
        let late = ProgrammeEntry::new(at(23, 30), Duration::minutes(30), "Late Show");
        assert!(late.ends_at_midnight());
        assert!(!late.starts_at_midnight());

        let early = ProgrammeEntry::new(at(0, 0), Duration::hours(1), "Late Show");
        assert!(early.starts_at_midnight());
        assert!(!early.ends_at_midnight());
        assert_eq!(early.end(), at(1, 0));
    }

    #[test]
    fn test_end_saturates_instead_of_overflowing() {
        let last_day = NaiveDateTime::MAX - Duration::minutes(30);
        let entry = ProgrammeEntry::new(last_day, Duration::hours(2), "Forever");
        assert_eq!(entry.end(), NaiveDateTime::MAX);
        assert!(!entry.ends_at_midnight());

        let first_day = NaiveDateTime::MIN + Duration::minutes(30);
        let backwards = ProgrammeEntry::new(first_day, Duration::hours(-2), "Never");
        assert_eq!(backwards.end(), NaiveDateTime::MIN);
    }

    #[test]
    fn test_json_omits_absent_fields() {
        let mut entry = ProgrammeEntry::new(at(20, 0), Duration::minutes(30), "News");
        entry.short_description = Some("Evening update".to_string());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["start"], "2024-03-01T20:00:00");
        assert_eq!(json["duration"], "30m");
        assert_eq!(json["short_description"], "Evening update");
        assert!(json.get("subtitle").is_none());
        assert!(json.get("credits").is_none());

        let back: ProgrammeEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
