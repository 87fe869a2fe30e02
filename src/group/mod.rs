//! Entity selection and long-form reshaping.

mod entities;

pub use entities::{group_entities, normalize_entity_list, parse_list, DIAGNOSTIC_ID_COUNT};
