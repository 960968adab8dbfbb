//! Terminal frontend for the todo service.
//!
//! The [`view::TodoView`] owns the query cache from `todoq-core` and the
//! screen-local state (add-form text, pending flags); [`transport`] executes
//! the HTTP requests the cache hands out. The binary wraps the view in a
//! line-oriented event loop.

pub mod transport;
pub mod view;
