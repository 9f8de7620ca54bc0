//! Time-ordered merge of programme sequences
//!
//! Both sequences must already be ascending by start time; the loaders
//! guarantee this and the engine does not re-check it. Three strategies are
//! used, chosen from the state of the target and [`MergeOptions`]:
//!
//! 1. **Initial copy** when the target is empty.
//! 2. **Append only**: a single boundary cut plus append.
//! 3. **Full merge**: a two-pointer walk resolving equal start times through
//!    [`merge_fields`].

use std::cmp::Ordering;

use tracing::{debug, info};

use super::field_precedence::merge_fields;
use super::matcher::find_match;
use crate::models::{EpgCollection, MergeOptions, Precedence, Station};

/// What a single [`merge_channel`] call did to the target sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Entries placed before an existing entry
    pub inserted: usize,
    /// Entries added at the end of the sequence
    pub appended: usize,
    /// Existing entries that absorbed an incoming entry with the same start
    pub updated: usize,
    /// Incoming entries dropped by an append-only cut
    pub discarded: usize,
}

impl MergeOutcome {
    fn accumulate(&mut self, other: &MergeOutcome) {
        self.inserted += other.inserted;
        self.appended += other.appended;
        self.updated += other.updated;
        self.discarded += other.discarded;
    }
}

/// Totals for a [`merge_all`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub channels_added: usize,
    pub channels_merged: usize,
    pub programmes: MergeOutcome,
}

impl MergeSummary {
    pub fn accumulate(&mut self, other: &MergeSummary) {
        self.channels_added += other.channels_added;
        self.channels_merged += other.channels_merged;
        self.programmes.accumulate(&other.programmes);
    }
}

/// Merge `source` into `target` in place.
///
/// An empty source leaves the target untouched.
pub fn merge_channel(
    target: &mut EpgCollection,
    source: EpgCollection,
    options: &MergeOptions,
) -> MergeOutcome {
    if source.is_empty() {
        return MergeOutcome::default();
    }

    if target.is_empty() {
        let appended = source.len();
        *target = source;
        return MergeOutcome {
            appended,
            ..MergeOutcome::default()
        };
    }

    if options.append_only {
        append_only(target, source, options.precedence)
    } else {
        full_merge(target, source, options.precedence)
    }
}

fn append_only(target: &mut EpgCollection, source: EpgCollection, precedence: Precedence) -> MergeOutcome {
    match precedence {
        Precedence::Broadcast => {
            let boundary = match target.last() {
                Some(last) => last.end(),
                None => return MergeOutcome::default(),
            };
            let offered = source.len();
            let before = target.len();
            target.extend(source.into_iter().filter(|entry| entry.start >= boundary));
            let appended = target.len() - before;
            MergeOutcome {
                appended,
                discarded: offered - appended,
                ..MergeOutcome::default()
            }
        }
        Precedence::File => {
            let boundary = match source.last() {
                Some(last) => last.end(),
                None => return MergeOutcome::default(),
            };
            let offered = source.len();
            let previous = std::mem::take(target);
            let replaced = previous.len();
            let mut merged = source;
            merged.extend(previous.into_iter().filter(|entry| entry.start >= boundary));
            let retained = merged.len() - offered;
            *target = merged;
            MergeOutcome {
                appended: offered,
                discarded: replaced - retained,
                ..MergeOutcome::default()
            }
        }
    }
}

fn full_merge(target: &mut EpgCollection, source: EpgCollection, precedence: Precedence) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    let mut i = 0;

    for incoming in source {
        loop {
            let last = target.len() - 1;
            match target[i].start.cmp(&incoming.start) {
                Ordering::Equal => {
                    merge_fields(&mut target[i], &incoming, precedence);
                    outcome.updated += 1;
                    // The last target entry stays the comparison point instead of
                    // moving past the end. Kept for compatibility with the
                    // established merge results.
                    if i < last {
                        i += 1;
                    }
                    break;
                }
                Ordering::Less if i < last => i += 1,
                Ordering::Less => {
                    target.push(incoming);
                    outcome.appended += 1;
                    break;
                }
                Ordering::Greater => {
                    target.insert(i, incoming);
                    outcome.inserted += 1;
                    break;
                }
            }
        }
    }

    outcome
}

/// Reconcile a whole import against the broadcast-collected stations.
///
/// Each incoming station is merged into the first existing station the
/// matcher accepts; unmatched stations are appended as new channels (and can
/// themselves be matched by later incoming stations).
pub fn merge_all(existing: &mut Vec<Station>, incoming: Vec<Station>, options: &MergeOptions) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for station in incoming {
        match find_match(existing, &station) {
            Some(index) => {
                let target = &mut existing[index];
                let outcome = merge_channel(&mut target.programmes, station.programmes, options);
                debug!(
                    "Merged {} into {}: {} inserted, {} appended, {} updated, {} discarded",
                    station.name,
                    target,
                    outcome.inserted,
                    outcome.appended,
                    outcome.updated,
                    outcome.discarded
                );
                summary.channels_merged += 1;
                summary.programmes.accumulate(&outcome);
            }
            None => {
                debug!(
                    "No broadcast station matches {} - adding as new channel",
                    station
                );
                summary.channels_added += 1;
                summary.programmes.appended += station.programmes.len();
                existing.push(station);
            }
        }
    }

    info!(
        "Merge complete ({} precedence{}): {} channels merged, {} added",
        options.precedence,
        if options.append_only { ", append only" } else { "" },
        summary.channels_merged,
        summary.channels_added
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgrammeEntry;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn entry(h: u32, m: u32, minutes: i64, name: &str) -> ProgrammeEntry {
        ProgrammeEntry::new(at(h, m), Duration::minutes(minutes), name)
    }

    fn starts(sequence: &EpgCollection) -> Vec<NaiveDateTime> {
        sequence.iter().map(|e| e.start).collect()
    }

    fn full(precedence: Precedence) -> MergeOptions {
        MergeOptions::new(precedence, false)
    }

    #[test]
    fn test_empty_source_is_noop() {
        let mut target = vec![entry(20, 0, 30, "News")];
        let before = target.clone();
        for append_only in [false, true] {
            let options = MergeOptions::new(Precedence::File, append_only);
            let outcome = merge_channel(&mut target, Vec::new(), &options);
            assert_eq!(outcome, MergeOutcome::default());
            assert_eq!(target, before);
        }
    }

    #[test]
    fn test_initial_copy() {
        let source = vec![entry(20, 0, 30, "News"), entry(20, 30, 30, "Weather")];
        let mut target = Vec::new();
        let outcome = merge_channel(&mut target, source.clone(), &MergeOptions::new(Precedence::Broadcast, true));
        assert_eq!(target, source);
        assert_eq!(outcome.appended, 2);
    }

    #[test]
    fn test_full_merge_same_start_file_precedence() {
        let mut target = vec![entry(20, 0, 30, "News")];
        let mut incoming = entry(20, 0, 30, "News");
        incoming.short_description = Some("Evening update".to_string());

        let outcome = merge_channel(&mut target, vec![incoming], &full(Precedence::File));

        assert_eq!(target.len(), 1);
        assert_eq!(target[0].short_description.as_deref(), Some("Evening update"));
        assert_eq!(outcome.updated, 1);
    }

    #[test]
    fn test_full_merge_interleaves() {
        let mut target = vec![entry(18, 0, 60, "A"), entry(20, 0, 60, "C"), entry(22, 0, 60, "E")];
        let source = vec![
            entry(17, 0, 60, "before"),
            entry(19, 0, 60, "B"),
            entry(20, 0, 60, "C2"),
            entry(21, 0, 60, "D"),
            entry(23, 0, 60, "F"),
            entry(23, 30, 30, "G"),
        ];

        let outcome = merge_channel(&mut target, source, &full(Precedence::Broadcast));

        let names: Vec<_> = target.iter().map(|e| e.event_name.as_str()).collect();
        assert_eq!(names, vec!["before", "A", "B", "C", "D", "E", "F", "G"]);
        assert_eq!(
            outcome,
            MergeOutcome {
                inserted: 3,
                appended: 2,
                updated: 1,
                discarded: 0,
            }
        );
    }

    #[test]
    fn test_full_merge_keeps_trailing_target_entries() {
        let mut target = vec![entry(18, 0, 60, "A"), entry(19, 0, 60, "B"), entry(20, 0, 60, "C")];
        let source = vec![entry(17, 0, 60, "early")];

        merge_channel(&mut target, source, &full(Precedence::File));
        assert_eq!(starts(&target), vec![at(17, 0), at(18, 0), at(19, 0), at(20, 0)]);
    }

    #[test]
    fn test_full_merge_last_target_absorbs_equal_start() {
        // the final target entry is not advanced past on an equal start
        let mut target = vec![entry(20, 0, 60, "News")];
        let mut incoming = entry(20, 0, 60, "News");
        incoming.subtitle = Some("Late edition".to_string());
        let source = vec![incoming, entry(21, 0, 60, "Film")];

        merge_channel(&mut target, source, &full(Precedence::File));

        assert_eq!(starts(&target), vec![at(20, 0), at(21, 0)]);
        assert_eq!(target[0].subtitle.as_deref(), Some("Late edition"));
    }

    #[test]
    fn test_append_only_broadcast_cuts_at_target_end() {
        // last target entry ends at 23:00
        let mut target = vec![entry(22, 0, 60, "Drama")];
        let source = vec![entry(22, 30, 30, "Overlap"), entry(23, 30, 30, "Late")];

        let outcome = merge_channel(&mut target, source, &MergeOptions::new(Precedence::Broadcast, true));

        assert_eq!(target.len(), 2);
        assert_eq!(target[1].event_name, "Late");
        assert_eq!(outcome.appended, 1);
        assert_eq!(outcome.discarded, 1);
    }

    #[test]
    fn test_append_only_broadcast_boundary_is_inclusive() {
        let mut target = vec![entry(22, 0, 60, "Drama")];
        let source = vec![entry(23, 0, 30, "Exactly at end")];
        merge_channel(&mut target, source, &MergeOptions::new(Precedence::Broadcast, true));
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn test_append_only_at_calendar_limit() {
        let near_limit = NaiveDateTime::MAX - Duration::minutes(30);
        let last = ProgrammeEntry::new(near_limit, Duration::hours(2), "Forever");

        let mut target = vec![last.clone()];
        let outcome = merge_channel(
            &mut target,
            vec![entry(23, 30, 30, "Late")],
            &MergeOptions::new(Precedence::Broadcast, true),
        );
        assert_eq!(outcome.discarded, 1);
        assert_eq!(target.len(), 1);

        let mut target = vec![entry(23, 30, 30, "Late")];
        let outcome = merge_channel(&mut target, vec![last], &MergeOptions::new(Precedence::File, true));
        assert_eq!(outcome.discarded, 1);
        assert_eq!(target[0].event_name, "Forever");
    }

    #[test]
    fn test_append_only_file_source_becomes_authoritative() {
        let mut target = vec![
            entry(20, 0, 60, "Old news"),
            entry(21, 0, 60, "Old film"),
            entry(22, 0, 60, "Old late"),
        ];
        // last source entry ends at 22:00
        let source = vec![entry(20, 0, 30, "News"), entry(20, 30, 90, "Film")];

        let outcome = merge_channel(&mut target, source, &MergeOptions::new(Precedence::File, true));

        let names: Vec<_> = target.iter().map(|e| e.event_name.as_str()).collect();
        assert_eq!(names, vec!["News", "Film", "Old late"]);
        assert_eq!(outcome.appended, 2);
        assert_eq!(outcome.discarded, 2);
    }

    #[test]
    fn test_merge_all_adds_unmatched_and_merges_matched() {
        let mut existing = vec![Station::new("BBC One").with_ids(1, 2, 3)];
        existing[0].programmes = vec![entry(20, 0, 30, "News")];

        let mut matched = Station::new("BBC 1").with_ids(1, 2, 3);
        matched.programmes = vec![entry(20, 30, 30, "Weather")];
        let mut new_station = Station::new("BBC Two").with_ids(1, 2, 4);
        new_station.programmes = vec![entry(19, 0, 60, "Quiz")];

        let summary = merge_all(&mut existing, vec![matched, new_station], &full(Precedence::Broadcast));

        assert_eq!(existing.len(), 2);
        assert_eq!(existing[0].programmes.len(), 2);
        assert_eq!(existing[1].name, "BBC Two");
        assert_eq!(summary.channels_merged, 1);
        assert_eq!(summary.channels_added, 1);
        assert_eq!(summary.programmes.appended, 2);
    }

    #[test]
    fn test_merge_all_matches_stations_added_earlier_in_same_import() {
        let mut existing = Vec::new();
        let mut first = Station::new("Prime");
        first.programmes = vec![entry(20, 0, 30, "News")];
        let mut second = Station::new("PRIME");
        second.programmes = vec![entry(21, 0, 30, "Sport")];

        let summary = merge_all(&mut existing, vec![first, second], &full(Precedence::File));

        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].programmes.len(), 2);
        assert_eq!(summary.channels_added, 1);
        assert_eq!(summary.channels_merged, 1);
    }
}
