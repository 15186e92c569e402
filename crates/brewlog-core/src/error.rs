//! Domain-level error types.

use thiserror::Error;

/// Errors reported by the remote data gateway and its adapters.
///
/// `Remote` carries the service's own message untouched so it can be shown
/// to the user verbatim.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Remote(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Mutation failures surfaced by the optimistic update engine.
///
/// The first six variants are local precondition violations: they are
/// detected synchronously and never cause a network call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("You must be signed in to do that")]
    SignInRequired,

    #[error("An image is required to create a post")]
    MissingImage,

    #[error("You do not have permission to delete this post")]
    Forbidden,

    #[error("Post {id} not found")]
    NotFound { id: i64 },

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Comment text cannot be empty")]
    EmptyComment,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
