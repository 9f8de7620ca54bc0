use serde::{Deserialize, Serialize};

pub mod programme;
pub mod station;
pub mod tuning;

pub use programme::{Credits, EpgCollection, ProgrammeEntry};
pub use station::Station;
pub use tuning::{CollectionType, Provider, TuningFrequency, TuningParameters};

use crate::errors::AppError;

/// Which source wins when broadcast-collected and imported data conflict
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    /// Previously collected (target) data wins
    #[default]
    Broadcast,
    /// Newly imported (source) data wins
    File,
}

impl std::fmt::Display for Precedence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precedence::Broadcast => write!(f, "broadcast"),
            Precedence::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for Precedence {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "broadcast" => Ok(Precedence::Broadcast),
            "file" => Ok(Precedence::File),
            _ => Err(AppError::validation(format!("Invalid precedence: {s}"))),
        }
    }
}

/// Run-scoped settings for one merge pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub precedence: Precedence,
    pub append_only: bool,
}

impl MergeOptions {
    pub fn new(precedence: Precedence, append_only: bool) -> Self {
        Self {
            precedence,
            append_only,
        }
    }
}
