//! Centralized error handling for the EPG reconciliation tool
//!
//! # Error Categories
//!
//! - **IO / JSON / TOML Errors**: reading configuration, import files and the
//!   broadcast store
//! - **Source Errors**: malformed XMLTV content or timestamps
//! - **Configuration / Validation Errors**: bad settings detected up front
//!
//! # Usage
//!
//! ```rust
//! use epg_reconcile::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::validation("nothing to do"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
