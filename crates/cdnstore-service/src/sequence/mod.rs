//! Human-readable code allocation.

pub mod allocator;

pub use allocator::SequenceAllocator;
