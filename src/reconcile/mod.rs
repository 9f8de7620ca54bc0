//! EPG reconciliation engine
//!
//! Pairs imported stations with broadcast-collected ones, merges their
//! programme sequences, and recombines programmes split at midnight. All
//! operations are synchronous and in-memory; run-scoped settings arrive as
//! explicit option values.

pub mod field_precedence;
pub mod matcher;
pub mod merge_engine;
pub mod midnight;

pub use field_precedence::merge_fields;
pub use matcher::{find_match, matches};
pub use merge_engine::{merge_all, merge_channel, MergeOutcome, MergeSummary};
pub use midnight::{combine_if_split, combine_split_programmes, MidnightOptions, MidnightRule};
