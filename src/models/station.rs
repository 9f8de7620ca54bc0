//! Stations: one logical broadcast service and its schedule

use serde::{Deserialize, Serialize};

use super::programme::EpgCollection;

fn default_included() -> bool {
    true
}

/// A broadcastable logical service.
///
/// The three DVB identifiers together form an optional strong identity key;
/// `None` means the identifier was never seen (the `-1` sentinel in tuning
/// files).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    #[serde(default)]
    pub original_network_id: Option<u16>,
    #[serde(default)]
    pub transport_stream_id: Option<u16>,
    #[serde(default)]
    pub service_id: Option<u16>,

    pub name: String,
    /// User-assigned rename, takes over from `name` for display and matching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default = "default_included")]
    pub included: bool,
    /// Set on imported stations that must be matched by name only
    #[serde(default)]
    pub use_name_for_merge: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default)]
    pub programmes: EpgCollection,
}

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            original_network_id: None,
            transport_stream_id: None,
            service_id: None,
            name: name.into(),
            new_name: None,
            included: true,
            use_name_for_merge: false,
            provider: None,
            programmes: Vec::new(),
        }
    }

    pub fn with_ids(mut self, onid: u16, tsid: u16, sid: u16) -> Self {
        self.original_network_id = Some(onid);
        self.transport_stream_id = Some(tsid);
        self.service_id = Some(sid);
        self
    }

    /// The rename when one is set, otherwise the broadcast name
    pub fn effective_name(&self) -> &str {
        match self.new_name.as_deref() {
            Some(renamed) if !renamed.trim().is_empty() => renamed,
            _ => &self.name,
        }
    }

    /// All three identifiers, when every one of them is known
    pub fn service_key(&self) -> Option<(u16, u16, u16)> {
        Some((
            self.original_network_id?,
            self.transport_stream_id?,
            self.service_id?,
        ))
    }

    /// Sort programmes by start and drop entries repeating a start time.
    ///
    /// Returns the number of entries dropped.
    pub fn normalize_programmes(&mut self) -> usize {
        let before = self.programmes.len();
        self.programmes.sort_by_key(|entry| entry.start);
        self.programmes.dedup_by_key(|entry| entry.start);
        before - self.programmes.len()
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.service_key() {
            Some((onid, tsid, sid)) => {
                write!(f, "'{}' ({}:{}:{})", self.effective_name(), onid, tsid, sid)
            }
            None => write!(f, "'{}'", self.effective_name()),
        }
    }
}
