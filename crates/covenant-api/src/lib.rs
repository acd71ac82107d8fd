//! Covenant-api: HTTP API layer for Covenant
//!
//! Provides a RESTful API for the presentation shell to interact with the
//! market engine.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, MarketContext};
