//! Tuning frequencies and providers, reduced to what reconciliation needs

use serde::{Deserialize, Serialize};

/// How programme data was gathered from the multiplex
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    #[default]
    Eit,
    Mheg5,
    OpenTv,
    FreeSat,
    Psip,
}

impl CollectionType {
    /// Collection methods that deliver one programme as two entries split at local midnight
    pub fn splits_at_midnight(self) -> bool {
        matches!(self, CollectionType::Mheg5)
    }
}

/// Delivery-system specific tuning parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TuningParameters {
    Satellite {
        symbol_rate: u32,
        polarization: String,
        fec: String,
    },
    Cable {
        symbol_rate: u32,
        modulation: String,
    },
    Terrestrial {
        bandwidth: u32,
    },
    Atsc {
        physical_channel: u32,
        modulation: String,
    },
}

impl TuningParameters {
    pub fn kind(&self) -> &'static str {
        match self {
            TuningParameters::Satellite { .. } => "satellite",
            TuningParameters::Cable { .. } => "cable",
            TuningParameters::Terrestrial { .. } => "terrestrial",
            TuningParameters::Atsc { .. } => "atsc",
        }
    }
}

/// A broadcaster or platform operator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// One configured tuning frequency (multiplex)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TuningFrequency {
    /// Frequency in kHz
    pub frequency: u32,
    #[serde(default)]
    pub collection_type: CollectionType,
    /// ISO 3166 alpha-3 code, e.g. `NZL`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub parameters: TuningParameters,
}
