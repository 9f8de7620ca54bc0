//! Recombines programmes that a collection method split at local midnight
//!
//! Some collection methods deliver schedules one broadcast day at a time, so
//! a programme running across midnight shows up as two adjacent entries with
//! the same title. Which pairs are really one programme depends on the
//! broadcaster, so the test is chosen by country.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Station, TuningFrequency};

/// Longest second half that is still treated as part of a split programme
const MAX_SPLIT_TAIL_HOURS: i64 = 3;

/// Country-specific test for a midnight split
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MidnightRule {
    /// The first part ends at midnight and the second part, starting at
    /// midnight and running at most three hours, follows on directly. The
    /// first entry is extended to cover both.
    #[default]
    NewZealand,
    /// The second part starts at midnight and both entries end at the same
    /// instant. The second entry is a duplicate and is dropped as is.
    Australia,
    /// Never combine
    Disabled,
}

impl MidnightRule {
    /// Rule for an ISO 3166 alpha-3 country code; no code means New Zealand
    pub fn from_country_code(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_uppercase()) {
            None => MidnightRule::NewZealand,
            Some(code) if code == "NZL" => MidnightRule::NewZealand,
            Some(code) if code == "AUS" => MidnightRule::Australia,
            Some(_) => MidnightRule::Disabled,
        }
    }
}

/// Midnight handling resolved for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidnightOptions {
    pub enabled: bool,
    pub rule: MidnightRule,
}

impl MidnightOptions {
    /// Derive the options from the first configured tuning frequency.
    ///
    /// Handling is enabled when that frequency's collection type splits at
    /// midnight, unless `enabled_override` says otherwise.
    pub fn resolve(frequencies: &[TuningFrequency], enabled_override: Option<bool>) -> Self {
        let first = frequencies.first();
        let enabled = enabled_override
            .unwrap_or_else(|| first.is_some_and(|f| f.collection_type.splits_at_midnight()));
        let rule = MidnightRule::from_country_code(first.and_then(|f| f.country_code.as_deref()));

        Self { enabled, rule }
    }
}

/// Combine `programmes[index]` with the entry after it when they are one
/// programme split at midnight.
///
/// On success the second entry is removed, so the caller must look at the
/// same index again rather than advancing.
pub fn combine_if_split(station: &mut Station, index: usize, options: &MidnightOptions) -> bool {
    if !options.enabled || index + 1 >= station.programmes.len() {
        return false;
    }

    let current = &station.programmes[index];
    let next = &station.programmes[index + 1];

    if current.event_name != next.event_name {
        return false;
    }

    let combine = match options.rule {
        MidnightRule::NewZealand => {
            current.ends_at_midnight()
                && next.starts_at_midnight()
                && current.end() == next.start
                && next.duration <= Duration::hours(MAX_SPLIT_TAIL_HOURS)
        }
        MidnightRule::Australia => next.starts_at_midnight() && current.end() == next.end(),
        MidnightRule::Disabled => false,
    };
    if !combine {
        return false;
    }

    let removed = station.programmes.remove(index + 1);
    if options.rule == MidnightRule::NewZealand {
        station.programmes[index].duration = station.programmes[index].duration + removed.duration;
    }

    debug!(
        "Combined '{}' at {} on {} across midnight",
        removed.event_name, removed.start, station
    );
    true
}

/// Run [`combine_if_split`] over a whole station; returns the number of combines
pub fn combine_split_programmes(station: &mut Station, options: &MidnightOptions) -> usize {
    if !options.enabled {
        return 0;
    }

    let mut combined = 0;
    let mut index = 0;
    while index + 1 < station.programmes.len() {
        if combine_if_split(station, index, options) {
            combined += 1;
        } else {
            index += 1;
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionType, ProgrammeEntry, TuningParameters};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn station(entries: Vec<ProgrammeEntry>) -> Station {
        let mut station = Station::new("TVNZ 1");
        station.programmes = entries;
        station
    }

    fn options(rule: MidnightRule) -> MidnightOptions {
        MidnightOptions {
            enabled: true,
            rule,
        }
    }

    #[test]
    fn test_new_zealand_rule_extends_first_part() {
        let mut station = station(vec![
            ProgrammeEntry::new(at(1, 23, 30), Duration::minutes(30), "Late Show"),
            ProgrammeEntry::new(at(2, 0, 0), Duration::hours(1), "Late Show"),
        ]);

        assert!(combine_if_split(&mut station, 0, &options(MidnightRule::NewZealand)));
        assert_eq!(station.programmes.len(), 1);
        assert_eq!(station.programmes[0].duration, Duration::minutes(90));
    }

    #[test]
    fn test_new_zealand_rule_rejects_long_tail_and_gaps() {
        let long_tail = vec![
            ProgrammeEntry::new(at(1, 23, 0), Duration::hours(1), "Movie"),
            ProgrammeEntry::new(at(2, 0, 0), Duration::minutes(181), "Movie"),
        ];
        let mut station_a = station(long_tail);
        assert!(!combine_if_split(&mut station_a, 0, &options(MidnightRule::NewZealand)));

        let not_at_midnight = vec![
            ProgrammeEntry::new(at(1, 23, 0), Duration::minutes(50), "Movie"),
            ProgrammeEntry::new(at(2, 0, 0), Duration::hours(1), "Movie"),
        ];
        let mut station_b = station(not_at_midnight);
        assert!(!combine_if_split(&mut station_b, 0, &options(MidnightRule::NewZealand)));
        assert_eq!(station_b.programmes.len(), 2);
    }

    #[test]
    fn test_requires_identical_names() {
        let mut station = station(vec![
            ProgrammeEntry::new(at(1, 23, 30), Duration::minutes(30), "Late Show"),
            ProgrammeEntry::new(at(2, 0, 0), Duration::hours(1), "late show"),
        ]);
        assert!(!combine_if_split(&mut station, 0, &options(MidnightRule::NewZealand)));
    }

    #[test]
    fn test_australia_rule_drops_duplicate_without_resizing() {
        let mut station = station(vec![
            ProgrammeEntry::new(at(1, 23, 0), Duration::hours(2), "Cricket"),
            ProgrammeEntry::new(at(2, 0, 0), Duration::hours(1), "Cricket"),
            ProgrammeEntry::new(at(2, 1, 0), Duration::hours(1), "News"),
        ]);

        assert!(combine_if_split(&mut station, 0, &options(MidnightRule::Australia)));
        assert_eq!(station.programmes.len(), 2);
        assert_eq!(station.programmes[0].duration, Duration::hours(2));
        assert_eq!(station.programmes[1].event_name, "News");
    }

    #[test]
    fn test_australia_rule_ignores_new_zealand_shape() {
        let mut station = station(vec![
            ProgrammeEntry::new(at(1, 23, 30), Duration::minutes(30), "Late Show"),
            ProgrammeEntry::new(at(2, 0, 0), Duration::hours(1), "Late Show"),
        ]);
        assert!(!combine_if_split(&mut station, 0, &options(MidnightRule::Australia)));
    }

    #[test]
    fn test_last_entry_and_disabled_are_noops() {
        let mut station = station(vec![ProgrammeEntry::new(at(1, 23, 30), Duration::minutes(30), "Late Show")]);
        assert!(!combine_if_split(&mut station, 0, &options(MidnightRule::NewZealand)));

        let mut pair = station.clone();
        pair.programmes
            .push(ProgrammeEntry::new(at(2, 0, 0), Duration::hours(1), "Late Show"));
        let off = MidnightOptions {
            enabled: false,
            rule: MidnightRule::NewZealand,
        };
        assert!(!combine_if_split(&mut pair, 0, &off));
        assert!(!combine_if_split(&mut pair, 0, &options(MidnightRule::Disabled)));
    }

    #[test]
    fn test_combine_split_programmes_walks_station() {
        let mut station = station(vec![
            ProgrammeEntry::new(at(1, 22, 0), Duration::hours(2), "Film"),
            ProgrammeEntry::new(at(2, 0, 0), Duration::minutes(30), "Film"),
            ProgrammeEntry::new(at(2, 0, 30), Duration::hours(23), "Marathon"),
            ProgrammeEntry::new(at(2, 23, 30), Duration::minutes(30), "Late Show"),
            ProgrammeEntry::new(at(3, 0, 0), Duration::minutes(45), "Late Show"),
        ]);

        let combined = combine_split_programmes(&mut station, &options(MidnightRule::NewZealand));

        assert_eq!(combined, 2);
        assert_eq!(station.programmes.len(), 3);
        assert_eq!(station.programmes[0].duration, Duration::minutes(150));
        assert_eq!(station.programmes[2].duration, Duration::minutes(75));
    }

    #[test]
    fn test_calendar_limit_does_not_combine() {
        let near_limit = NaiveDateTime::MAX - Duration::minutes(30);
        for rule in [MidnightRule::NewZealand, MidnightRule::Australia] {
            let mut station = station(vec![
                ProgrammeEntry::new(near_limit - Duration::hours(1), Duration::hours(2), "Forever"),
                ProgrammeEntry::new(near_limit, Duration::hours(2), "Forever"),
            ]);
            assert_eq!(combine_split_programmes(&mut station, &options(rule)), 0);
            assert_eq!(station.programmes.len(), 2);
        }
    }

    #[test]
    fn test_rule_from_country_code() {
        assert_eq!(MidnightRule::from_country_code(None), MidnightRule::NewZealand);
        assert_eq!(MidnightRule::from_country_code(Some("nzl")), MidnightRule::NewZealand);
        assert_eq!(MidnightRule::from_country_code(Some("AUS")), MidnightRule::Australia);
        assert_eq!(MidnightRule::from_country_code(Some("GBR")), MidnightRule::Disabled);
    }

    #[test]
    fn test_resolve_uses_first_frequency() {
        let frequency = |collection_type, country: &str| TuningFrequency {
            frequency: 594_000,
            collection_type,
            country_code: Some(country.to_string()),
            provider: None,
            parameters: TuningParameters::Terrestrial { bandwidth: 7 },
        };
        let frequencies = vec![
            frequency(CollectionType::Mheg5, "AUS"),
            frequency(CollectionType::Eit, "NZL"),
        ];

        let resolved = MidnightOptions::resolve(&frequencies, None);
        assert!(resolved.enabled);
        assert_eq!(resolved.rule, MidnightRule::Australia);

        assert!(!MidnightOptions::resolve(&frequencies, Some(false)).enabled);
        let none = MidnightOptions::resolve(&[], None);
        assert!(!none.enabled);
        assert_eq!(none.rule, MidnightRule::NewZealand);
    }
}
