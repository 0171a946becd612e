//! Vetra Core — domain models, repository traits, and shared error
//! types for the volunteer vetting tracker.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{VetraError, VetraResult};
