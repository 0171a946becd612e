//! Vetra Flow — workflow services over the repository traits: the
//! role/step catalog, volunteer profiles and tracked-role selection,
//! per-step progress, and the review queue.

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod profile;
pub mod progress;
pub mod queue;
pub mod review;

pub use catalog::CatalogService;
pub use config::FlowConfig;
pub use error::FlowError;
pub use notify::{ChangeBus, ChangeEvent, Subscription, Topic};
pub use profile::{ProfileService, RoleSelection};
pub use progress::ProgressService;
pub use queue::ReviewQueueView;
pub use review::ReviewService;
