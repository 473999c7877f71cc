//! Castline API Library
//!
//! HTTP surface of the publishing pipeline: handlers, auth middleware and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod telemetry;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
pub use state::AppState;
