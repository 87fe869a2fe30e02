//! Value transformation before estimation.

pub mod log2;

pub use log2::{apply_transform, Transform};
