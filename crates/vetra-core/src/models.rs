//! Domain models for Vetra.
//!
//! These are the core types shared across all crates: the role/step
//! catalog, volunteer profiles, per-role progress, and the review
//! workflow entry.

pub mod profile;
pub mod progress;
pub mod review;
pub mod role;
pub mod step;
