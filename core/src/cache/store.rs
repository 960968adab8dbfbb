//! Cache entry state.

use crate::error::ApiError;
use crate::types::Todo;

use super::keys::Query;

/// Lifecycle of a cache entry. A fresh entry starts in `Loading` because the
/// fetch is dispatched as part of the first subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Loading,
    Ready,
    Failed,
}

/// Parsed result data held by a cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    Todos(Vec<Todo>),
    Todo(Todo),
}

impl QueryData {
    pub fn as_todos(&self) -> Option<&[Todo]> {
        match self {
            QueryData::Todos(todos) => Some(todos),
            QueryData::Todo(_) => None,
        }
    }

    pub fn as_todo(&self) -> Option<&Todo> {
        match self {
            QueryData::Todo(todo) => Some(todo),
            QueryData::Todos(_) => None,
        }
    }
}

/// One cache entry: status, last data, last error, and the live subscriber
/// count that decides eviction.
///
/// `data` survives a refetch (`Loading` with stale data is a valid state) but
/// is never reconciled locally — it is only ever replaced wholesale by a
/// fresh server response.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub status: QueryStatus,
    pub data: Option<QueryData>,
    pub error: Option<ApiError>,
    pub(crate) subscribers: usize,
    pub(crate) query: Query,
}

impl QueryState {
    pub(crate) fn loading(query: Query) -> Self {
        Self {
            status: QueryStatus::Loading,
            data: None,
            error: None,
            subscribers: 0,
            query,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
    }
}
