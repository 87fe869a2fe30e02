//! Per-entity condition filtering.

pub mod conditions;

pub use conditions::{sanitize_conditions, SanitizedEntity};
