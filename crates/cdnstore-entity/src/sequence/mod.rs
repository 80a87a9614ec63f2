//! Sequence counter entities and code planning.

pub mod date_tag;
pub mod model;
pub mod plan;

pub use date_tag::DateTag;
pub use model::{NewSequenceCounter, SequenceCounter};
pub use plan::{CodePlan, QUEUE_MAX, QUEUE_MIN, fallback_code};
