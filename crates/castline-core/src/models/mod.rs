//! Data models for the pipeline
//!
//! Each sub-module covers one domain area; all types are re-exported here.

mod broadcast;
mod draft;
mod episode;
mod platform;
mod podcast;

pub use broadcast::*;
pub use draft::*;
pub use episode::*;
pub use platform::*;
pub use podcast::*;
