//! # Brewlog Infrastructure
//!
//! Concrete implementations of the ports defined in `brewlog-core`:
//! an in-memory gateway (tests and offline fallback) and a REST gateway
//! for the remote backend-as-a-service, plus environment configuration
//! and telemetry setup.

pub mod config;
pub mod gateway;
pub mod telemetry;

pub use config::{DescriberConfig, GatewayConfig};
pub use gateway::{GeminiDescriber, InMemoryGateway, RestGateway};
