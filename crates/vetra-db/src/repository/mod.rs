//! SurrealDB repository implementations.

mod profile;
mod progress;
mod review;
mod role;
mod step;

pub use profile::SurrealProfileRepository;
pub use progress::SurrealProgressRepository;
pub use review::SurrealReviewRepository;
pub use role::SurrealRoleRepository;
pub use step::SurrealStepRepository;
