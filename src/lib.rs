pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod router;
pub mod service;

pub use config::Config;
pub use error::{ApiFailure, BrainError};
pub use router::{BrainState, brain_router};
