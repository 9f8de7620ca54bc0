//! Structural equality for broadcast entities
//!
//! Channels, tuning frequencies and providers are loaded independently from
//! several files, so "the same" entity rarely arrives as an identical value.
//! Each entity kind answers equality at three increasing levels of
//! strictness:
//!
//! - [`EqualityLevel::Identity`]: the key fields only (identifiers or names);
//!   never looks at optional sub-objects
//! - [`EqualityLevel::Similar`]: key fields plus the descriptive ones
//! - [`EqualityLevel::Entirely`]: every field, nested objects included
//!
//! [`BroadcastEntity::compare`] always evaluates the shallowest level first
//! and stops at the first level that fails.

use serde::{Deserialize, Serialize};

use crate::models::{Provider, Station, TuningFrequency};
use crate::utils::names_match;

/// Strictness of an equality comparison, ordered shallow to deep
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EqualityLevel {
    Identity,
    Similar,
    Entirely,
}

/// Per-level equality for one entity kind.
///
/// Each `*_matches` method checks only the fields its level adds; callers use
/// [`compare`](BroadcastEntity::compare), which chains them.
pub trait BroadcastEntity {
    fn identity_matches(&self, other: &Self) -> bool;

    fn similar_matches(&self, other: &Self) -> bool;

    fn entirely_matches(&self, other: &Self) -> bool;

    fn compare(&self, other: &Self, level: EqualityLevel) -> bool {
        if !self.identity_matches(other) {
            return false;
        }
        if level == EqualityLevel::Identity {
            return true;
        }
        if !self.similar_matches(other) {
            return false;
        }
        if level == EqualityLevel::Similar {
            return true;
        }
        self.entirely_matches(other)
    }
}

impl BroadcastEntity for Station {
    fn identity_matches(&self, other: &Self) -> bool {
        match (self.service_key(), other.service_key()) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => names_match(&self.name, &other.name),
        }
    }

    fn similar_matches(&self, other: &Self) -> bool {
        self.included == other.included && names_match(self.effective_name(), other.effective_name())
    }

    fn entirely_matches(&self, other: &Self) -> bool {
        self.original_network_id == other.original_network_id
            && self.transport_stream_id == other.transport_stream_id
            && self.service_id == other.service_id
            && self.included == other.included
            && self.name == other.name
            && self.new_name == other.new_name
            && self.provider == other.provider
            && self.use_name_for_merge == other.use_name_for_merge
            && self.programmes == other.programmes
    }
}

impl BroadcastEntity for TuningFrequency {
    fn identity_matches(&self, other: &Self) -> bool {
        self.frequency == other.frequency && self.parameters.kind() == other.parameters.kind()
    }

    fn similar_matches(&self, other: &Self) -> bool {
        self.parameters == other.parameters
    }

    fn entirely_matches(&self, other: &Self) -> bool {
        let providers_match = match (&self.provider, &other.provider) {
            (Some(mine), Some(theirs)) => mine.compare(theirs, EqualityLevel::Entirely),
            (None, None) => true,
            _ => false,
        };

        self.collection_type == other.collection_type
            && codes_match(self.country_code.as_deref(), other.country_code.as_deref())
            && providers_match
    }
}

impl BroadcastEntity for Provider {
    fn identity_matches(&self, other: &Self) -> bool {
        names_match(&self.name, &other.name)
    }

    fn similar_matches(&self, other: &Self) -> bool {
        codes_match(self.country_code.as_deref(), other.country_code.as_deref())
    }

    fn entirely_matches(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn codes_match(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) => names_match(l, r),
        (None, None) => true,
        _ => false,
    }
}

/// Borrowed view of any comparable entity.
///
/// Two views of different kinds are never equal, at any level.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Station(&'a Station),
    Frequency(&'a TuningFrequency),
    Provider(&'a Provider),
}

impl EntityRef<'_> {
    pub fn compare(&self, other: &EntityRef<'_>, level: EqualityLevel) -> bool {
        match (self, other) {
            (EntityRef::Station(a), EntityRef::Station(b)) => a.compare(b, level),
            (EntityRef::Frequency(a), EntityRef::Frequency(b)) => a.compare(b, level),
            (EntityRef::Provider(a), EntityRef::Provider(b)) => a.compare(b, level),
            _ => false,
        }
    }
}

impl<'a> From<&'a Station> for EntityRef<'a> {
    fn from(station: &'a Station) -> Self {
        EntityRef::Station(station)
    }
}

impl<'a> From<&'a TuningFrequency> for EntityRef<'a> {
    fn from(frequency: &'a TuningFrequency) -> Self {
        EntityRef::Frequency(frequency)
    }
}

impl<'a> From<&'a Provider> for EntityRef<'a> {
    fn from(provider: &'a Provider) -> Self {
        EntityRef::Provider(provider)
    }
}

/// Index of the first item equal to `candidate` at `level`
pub fn find_equal<T: BroadcastEntity>(items: &[T], candidate: &T, level: EqualityLevel) -> Option<usize> {
    items.iter().position(|item| item.compare(candidate, level))
}

/// Drop later duplicates at `level`, keeping the first occurrence of each entity
pub fn dedup_entities<T: BroadcastEntity>(items: Vec<T>, level: EqualityLevel) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if find_equal(&unique, &item, level).is_none() {
            unique.push(item);
        }
    }
    unique
}
