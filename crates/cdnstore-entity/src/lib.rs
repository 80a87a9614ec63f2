//! # cdnstore-entity
//!
//! Domain entity models for cdnstore. Database entities derive
//! `sqlx::FromRow`; value objects (size labels, subject references,
//! date tags) validate themselves on construction.

pub mod asset;
pub mod sequence;
