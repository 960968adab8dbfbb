//! Client-side data layer for the todo service.
//!
//! # Overview
//! Two pieces, both free of I/O (host-does-IO pattern):
//!
//! - [`TodoClient`] builds `HttpRequest` values and parses `HttpResponse`
//!   values for the five REST operations (list, get, create, replace,
//!   delete). The caller executes the actual round-trip.
//! - [`QueryCache`] sits on top: an explicit map from (endpoint, serialized
//!   argument) to cached results, with tag-based invalidation, a
//!   tag→entries reverse index, and reference-counted subscriptions.
//!   Mutations invalidate tags only after their response is observed
//!   successful; invalidated entries with live subscribers yield refetch
//!   requests for the host to execute.
//!
//! # Design
//! - The cache is single-consumer (a UI event loop), so its methods take
//!   `&mut self` instead of locking.
//! - Types use owned `String` / `Vec` fields; the cache hands out plain
//!   request values rather than futures, keeping everything deterministic
//!   and testable without a network.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use cache::{
    Mutation, MutationOutcome, Query, QueryCache, QueryData, QueryState, QueryStatus,
    SubscriptionId, Tag,
};
pub use client::{TodoClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Todo, UpdateTodo};
