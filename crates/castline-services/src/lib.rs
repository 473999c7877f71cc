//! Castline Services Layer
//!
//! The business service layer: draft lifecycle, credential vault, episode
//! operations and the distribution orchestrator. HTTP handling stays thin in
//! castline-api; coordination and invariants live here.

pub mod distribution;
pub mod drafts;
pub mod episodes;
pub mod locks;
pub mod vault;

#[cfg(test)]
pub(crate) mod test_support;

pub use distribution::{DistributionOrchestrator, DistributionSettings};
pub use drafts::DraftService;
pub use episodes::EpisodeService;
pub use locks::KeyedLocks;
pub use vault::{AccessCredential, CredentialVault};
