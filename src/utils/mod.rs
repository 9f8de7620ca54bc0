//! Utility modules shared by the loaders and the reconciliation engine

pub mod duration_serde;
pub mod time;

/// Case-insensitive comparison of two names after trimming whitespace
pub fn names_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Treats `None`, empty and whitespace-only strings as absent
pub fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}
