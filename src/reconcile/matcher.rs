//! Pairs an imported station with a broadcast-collected one

use crate::models::Station;
use crate::utils::names_match;

/// Whether `incoming` denotes the same logical channel as `existing`.
///
/// Rules, first applicable wins:
/// 1. `incoming` asks to be matched by name: the existing effective name
///    must equal the incoming name.
/// 2. Either side lacks a service id: the existing station must be included
///    and its effective name must equal the incoming name.
/// 3. Otherwise all three DVB identifiers must be equal.
///
/// Names compare case-insensitively after trimming. A `false` result just
/// means the incoming station is new.
pub fn matches(existing: &Station, incoming: &Station) -> bool {
    if incoming.use_name_for_merge {
        return names_match(existing.effective_name(), &incoming.name);
    }

    if existing.service_id.is_none() || incoming.service_id.is_none() {
        return existing.included && names_match(existing.effective_name(), &incoming.name);
    }

    existing.original_network_id == incoming.original_network_id
        && existing.transport_stream_id == incoming.transport_stream_id
        && existing.service_id == incoming.service_id
}

/// Index of the first station in `existing` that matches `incoming`
pub fn find_match(existing: &[Station], incoming: &Station) -> Option<usize> {
    existing.iter().position(|station| matches(station, incoming))
}
