//! Castline Database Layer
//!
//! Store traits the services depend on, their PostgreSQL repositories, and an
//! in-memory implementation used by tests and single-node development.

pub mod db;
pub mod memory;
pub mod store_traits;

pub use db::{ConnectionRepository, DraftRepository, EpisodeRepository, PodcastRepository};
pub use memory::InMemoryStore;
pub use store_traits::{ConnectionStore, DraftStore, EpisodeStore, PodcastStore};
