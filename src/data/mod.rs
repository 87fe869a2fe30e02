//! Data structures for estimation statistics.

mod annotation;
mod conditions;
mod measurement;
mod record;
mod result;
pub mod table;

pub use annotation::{AnnotationIndex, ConditionLookup, CONDITION_COLUMN, SAMPLE_COLUMN};
pub use conditions::ConditionSequence;
pub use measurement::{Cell, MeasurementTable};
pub use record::{ConditionGroup, EntityGroup, LongRecord, Observation};
pub use result::{BootstrapResult, IntervalMethod};
pub use table::{DelimitedFormat, DelimitedTable};
