//! Loading and saving of schedule data
//!
//! [`xmltv`] reads external guide files into stations; [`broadcast_store`]
//! persists the broadcast-collected stations that imports are merged into.

pub mod broadcast_store;
pub mod xmltv;

pub use broadcast_store::BroadcastStore;
pub use xmltv::{load_import_file, parse_xmltv, ImportSettings, XmltvImport};
