//! Domain logic for the face-assignment engine: shared types, the error
//! taxonomy, bounding-box geometry, match binding, confidence tiers, and
//! the retry policy. This crate performs no I/O.

pub mod error;
pub mod geometry;
pub mod matching;
pub mod retry;
pub mod status;
pub mod types;
