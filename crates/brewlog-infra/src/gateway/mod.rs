//! Gateway adapters.
//!
//! `memory` is the in-process implementation used by tests and as the
//! fallback when no remote service is configured; `rest` speaks the
//! Supabase-style REST contract of the real service; `gemini` backs the
//! description generator port.

mod gemini;
mod memory;
mod rest;

pub use gemini::GeminiDescriber;
pub use memory::InMemoryGateway;
pub use rest::RestGateway;
