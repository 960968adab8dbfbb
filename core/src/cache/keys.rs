//! Query, mutation, and tag definitions.
//!
//! # Design
//! `QueryKey` identifies a cache entry as (endpoint, serialized argument).
//! `Tag` is the invalidation currency: read results declare the tags they
//! provide, mutations declare the tags they invalidate, and the cache joins
//! the two through a reverse index.

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{CreateTodo, UpdateTodo};

/// A label attached to cached read results, matched against the labels a
/// mutation invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// One todo, by server-assigned id.
    Todo(u64),
    /// The collection as a whole.
    TodoList,
}

/// The read endpoints the cache can hold entries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListTodos,
    GetTodo,
}

/// Cache entry key: endpoint name plus the JSON-serialized argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: Endpoint,
    pub arg: String,
}

/// A read operation against the todo API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    ListTodos,
    GetTodo(u64),
}

impl Query {
    /// The cache key for this query. List takes no argument, which
    /// serializes as `null`.
    pub fn key(&self) -> QueryKey {
        let (endpoint, arg) = match self {
            Query::ListTodos => (Endpoint::ListTodos, serde_json::Value::Null),
            Query::GetTodo(id) => (Endpoint::GetTodo, serde_json::Value::from(*id)),
        };
        QueryKey {
            endpoint,
            arg: arg.to_string(),
        }
    }

    pub(crate) fn request(&self, client: &TodoClient) -> HttpRequest {
        match self {
            Query::ListTodos => client.build_list_todos(),
            Query::GetTodo(id) => client.build_get_todo(*id),
        }
    }
}

/// A write operation against the todo API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddTodo(CreateTodo),
    UpdateTodo { id: u64, body: UpdateTodo },
    DeleteTodo(u64),
}

impl Mutation {
    pub(crate) fn request(&self, client: &TodoClient) -> Result<HttpRequest, ApiError> {
        match self {
            Mutation::AddTodo(input) => client.build_create_todo(input),
            Mutation::UpdateTodo { id, body } => client.build_update_todo(*id, body),
            Mutation::DeleteTodo(id) => Ok(client.build_delete_todo(*id)),
        }
    }

    /// Tags this mutation marks stale once its response is observed
    /// successful. Add and delete touch the collection; a full-record
    /// replace touches only the one record.
    pub(crate) fn invalidates(&self) -> Vec<Tag> {
        match self {
            Mutation::AddTodo(_) | Mutation::DeleteTodo(_) => vec![Tag::TodoList],
            Mutation::UpdateTodo { id, .. } => vec![Tag::Todo(*id)],
        }
    }
}
