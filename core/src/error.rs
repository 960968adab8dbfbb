//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Http` with the raw status
//! code and body for debugging. `Transport` carries failures from the host's
//! I/O layer so they can flow through the same cache bookkeeping as server
//! errors. The enum is `Clone` because the query cache stores the last error
//! alongside the cached data.

use thiserror::Error;

/// Errors surfaced by the client and the query cache.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server returned 404 — the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The host's transport failed before a response was observed.
    #[error("transport error: {0}")]
    Transport(String),
}
