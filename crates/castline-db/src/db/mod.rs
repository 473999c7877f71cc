//! PostgreSQL repositories
//!
//! One repository per entity, each implementing the store trait the services
//! depend on. Queries use runtime `sqlx::query` so no `DATABASE_URL` is needed
//! at build time.

pub mod connection;
pub mod draft;
pub mod episode;
pub mod podcast;

pub use connection::ConnectionRepository;
pub use draft::DraftRepository;
pub use episode::EpisodeRepository;
pub use podcast::PodcastRepository;
