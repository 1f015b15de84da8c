//! Generation state: the coordinator and the pure transitions it applies.
//!
//! - [`coordinator`]: owner of all client state
//! - [`project`]: project lifecycle transitions
//! - [`slots`]: agent-slot derivation

pub mod coordinator;
pub mod error;
pub mod project;
pub mod slots;

pub use coordinator::{BannerKind, ErrorBanner, FollowUp, GenerationCoordinator};
pub use error::{CoordinatorError, CoordinatorResult};
pub use slots::{derive_agent_slots, slot_progress};
