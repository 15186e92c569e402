//! # Brewlog Core
//!
//! The domain layer of the brewlog client: entity model, local entity
//! store, optimistic update engine, filtering, session state, and the GPX
//! waypoint export. This crate contains pure business logic with zero
//! infrastructure dependencies; everything remote is reached through the
//! traits in [`ports`].

pub mod domain;
pub mod engine;
pub mod error;
pub mod filter;
pub mod gpx;
pub mod ports;
pub mod sample;
pub mod session;
pub mod store;

pub use engine::UpdateEngine;
pub use error::{EngineError, GatewayError};
pub use session::SessionState;
pub use store::EntityStore;
