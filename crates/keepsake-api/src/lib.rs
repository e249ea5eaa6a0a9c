//! Keepsake API Library
//!
//! HTTP handlers, media resolution, media lifecycle and application setup.

mod api_doc;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
