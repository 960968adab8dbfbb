//! Query cache with tag-based invalidation.
//!
//! # Overview
//! An explicit in-memory map from (endpoint, serialized argument) to cache
//! entries, with invalidation expressed as tags and a tag→entries reverse
//! index. Read results declare the tags they provide; mutations declare the
//! tags they invalidate; entries whose tags are invalidated are refetched if
//! anyone still subscribes to them.
//!
//! # Design
//! The cache is sans-IO, matching the client it wraps: `subscribe`,
//! `refetch`, and `start_mutation` hand the host `HttpRequest` values to
//! execute, and `complete_query` / `complete_mutation` consume the results.
//! All invalidation bookkeeping happens only after a mutation's response is
//! observed successful, so a failed write never touches cached reads.
//!
//! The cache is single-consumer and owned by the UI event loop, so there is
//! no interior locking — mutating calls take `&mut self`.
//!
//! Policies (deliberately explicit, since the backend contract leaves them
//! open): no automatic retry, no in-flight cancellation (a superseded fetch
//! completes and the last completion wins), and eviction the moment an
//! entry's subscriber count reaches zero.

mod keys;
mod registry;
mod store;

pub use keys::{Endpoint, Mutation, Query, QueryKey, Tag};
pub use store::{QueryData, QueryState, QueryStatus};

use std::collections::{HashMap, HashSet};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

use registry::TagRegistry;

/// Disposable handle returned by [`QueryCache::subscribe`].
///
/// Pass it back to [`QueryCache::unsubscribe`] to release the entry. The
/// handle is deliberately neither `Copy` nor `Clone`: one subscription, one
/// handle, one release.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Parsed result of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Created(crate::types::Todo),
    Updated(crate::types::Todo),
    Deleted,
}

/// The tag-invalidating query cache.
pub struct QueryCache {
    client: TodoClient,
    entries: HashMap<QueryKey, QueryState>,
    registry: TagRegistry,
    subscriptions: HashMap<u64, QueryKey>,
    next_subscription: u64,
}

impl QueryCache {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            entries: HashMap::new(),
            registry: TagRegistry::new(),
            subscriptions: HashMap::new(),
            next_subscription: 0,
        }
    }

    /// Subscribe to a query. Returns the disposable handle and, if the entry
    /// is new, the fetch request the host must execute. A second subscriber
    /// to an existing entry shares it and triggers no fetch.
    pub fn subscribe(&mut self, query: &Query) -> (SubscriptionId, Option<HttpRequest>) {
        let key = query.key();
        let request = match self.entries.get_mut(&key) {
            Some(state) => {
                state.subscribers += 1;
                None
            }
            None => {
                let mut state = QueryState::loading(query.clone());
                state.subscribers = 1;
                self.entries.insert(key.clone(), state);
                Some(query.request(&self.client))
            }
        };
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.insert(id, key);
        tracing::debug!(?query, id, fetching = request.is_some(), "subscribe");
        (SubscriptionId(id), request)
    }

    /// Release a subscription. When the last subscriber goes away the entry
    /// and its registry rows are evicted.
    pub fn unsubscribe(&mut self, handle: SubscriptionId) {
        let Some(key) = self.subscriptions.remove(&handle.0) else {
            return;
        };
        let Some(state) = self.entries.get_mut(&key) else {
            return;
        };
        state.subscribers = state.subscribers.saturating_sub(1);
        if state.subscribers == 0 {
            self.entries.remove(&key);
            self.registry.unregister(&key);
            tracing::debug!(?key, "evicted entry with no subscribers");
        }
    }

    /// Manually re-issue the fetch for a subscribed query. The entry moves
    /// to `Loading` but keeps its stale data until the completion lands.
    /// Returns `None` if nothing subscribes to the query.
    pub fn refetch(&mut self, query: &Query) -> Option<HttpRequest> {
        let state = self.entries.get_mut(&query.key())?;
        state.status = QueryStatus::Loading;
        state.error = None;
        Some(query.request(&self.client))
    }

    /// Current state of a query's cache entry, if anyone subscribes to it.
    pub fn query_state(&self, query: &Query) -> Option<&QueryState> {
        self.entries.get(&query.key())
    }

    /// Feed a fetch result back into the cache. Transport errors arrive
    /// through the same path as responses so they land in the entry's
    /// `error` slot. A completion for an entry that was unsubscribed while
    /// the fetch was in flight is dropped.
    pub fn complete_query(&mut self, query: &Query, result: Result<HttpResponse, ApiError>) {
        let key = query.key();
        let client = &self.client;
        let parsed = result.and_then(|response| match query {
            Query::ListTodos => client.parse_list_todos(response).map(QueryData::Todos),
            Query::GetTodo(_) => client.parse_get_todo(response).map(QueryData::Todo),
        });
        let Some(state) = self.entries.get_mut(&key) else {
            tracing::debug!(?query, "dropping completion for evicted entry");
            return;
        };
        match parsed {
            Ok(data) => {
                let tags = provided_tags(query, Some(&data));
                state.status = QueryStatus::Ready;
                state.data = Some(data);
                state.error = None;
                self.registry.register(key, tags);
            }
            Err(err) => {
                tracing::debug!(?query, %err, "query failed");
                state.status = QueryStatus::Failed;
                state.error = Some(err);
                self.registry.register(key, provided_tags(query, None));
            }
        }
    }

    /// Build the request for a mutation. Serialization of the payload can
    /// fail, so this returns `Result` unlike `subscribe`/`refetch`.
    pub fn start_mutation(&self, mutation: &Mutation) -> Result<HttpRequest, ApiError> {
        mutation.request(&self.client)
    }

    /// Feed a mutation result back in. On success the mutation's tags are
    /// invalidated and the refetch requests for affected subscribed entries
    /// are returned for the host to execute. On failure the cache is left
    /// exactly as it was and the error is handed back to the caller.
    pub fn complete_mutation(
        &mut self,
        mutation: &Mutation,
        result: Result<HttpResponse, ApiError>,
    ) -> Result<(MutationOutcome, Vec<(Query, HttpRequest)>), ApiError> {
        let response = result?;
        let outcome = match mutation {
            Mutation::AddTodo(_) => self
                .client
                .parse_create_todo(response)
                .map(MutationOutcome::Created)?,
            Mutation::UpdateTodo { .. } => self
                .client
                .parse_update_todo(response)
                .map(MutationOutcome::Updated)?,
            Mutation::DeleteTodo(_) => {
                self.client.parse_delete_todo(response)?;
                MutationOutcome::Deleted
            }
        };
        let refetches = self.invalidate(&mutation.invalidates());
        Ok((outcome, refetches))
    }

    /// Mark every entry providing any of `tags` stale. Subscribed entries
    /// move to `Loading` and their refetch requests are returned; an entry
    /// nobody subscribes to is dropped instead of refetched.
    pub fn invalidate(&mut self, tags: &[Tag]) -> Vec<(Query, HttpRequest)> {
        let mut affected: HashSet<QueryKey> = HashSet::new();
        for tag in tags {
            affected.extend(self.registry.keys_for_tag(tag));
        }
        let mut refetches = Vec::new();
        for key in affected {
            let Some(state) = self.entries.get_mut(&key) else {
                self.registry.unregister(&key);
                continue;
            };
            if state.subscribers == 0 {
                self.entries.remove(&key);
                self.registry.unregister(&key);
                continue;
            }
            state.status = QueryStatus::Loading;
            let query = state.query.clone();
            tracing::debug!(?tags, ?query, "invalidated, refetching");
            let request = query.request(&self.client);
            refetches.push((query, request));
        }
        refetches
    }
}

/// Tags a completed query provides. A successful list provides one tag per
/// returned item plus the collective list tag; a failed list still provides
/// the list tag so add/delete keep triggering its refetch. Get-one provides
/// its id tag regardless of outcome.
fn provided_tags(query: &Query, data: Option<&QueryData>) -> HashSet<Tag> {
    match (query, data) {
        (Query::ListTodos, Some(QueryData::Todos(todos))) => todos
            .iter()
            .map(|todo| Tag::Todo(todo.id))
            .chain([Tag::TodoList])
            .collect(),
        (Query::ListTodos, _) => HashSet::from([Tag::TodoList]),
        (Query::GetTodo(id), _) => HashSet::from([Tag::Todo(*id)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_BASE_URL;
    use crate::types::{CreateTodo, Todo, UpdateTodo};

    fn cache() -> QueryCache {
        QueryCache::new(TodoClient::new(DEFAULT_BASE_URL))
    }

    fn todo(id: u64, title: &str, completed: bool) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            completed,
            user_id: 1,
        }
    }

    fn list_response(todos: &[Todo]) -> HttpResponse {
        HttpResponse {
            status: 200,
            body: serde_json::to_string(todos).unwrap(),
        }
    }

    fn created_response(todo: &Todo) -> HttpResponse {
        HttpResponse {
            status: 201,
            body: serde_json::to_string(todo).unwrap(),
        }
    }

    /// Subscribe to the list and complete its initial fetch.
    fn ready_list(cache: &mut QueryCache, todos: &[Todo]) -> SubscriptionId {
        let (sub, request) = cache.subscribe(&Query::ListTodos);
        assert!(request.is_some(), "first subscriber should fetch");
        cache.complete_query(&Query::ListTodos, Ok(list_response(todos)));
        sub
    }

    #[test]
    fn first_subscriber_fetches_second_shares() {
        let mut cache = cache();
        let (_a, first) = cache.subscribe(&Query::ListTodos);
        let (_b, second) = cache.subscribe(&Query::ListTodos);

        assert!(first.is_some());
        assert!(second.is_none());
        let state = cache.query_state(&Query::ListTodos).unwrap();
        assert_eq!(state.subscriber_count(), 2);
        assert_eq!(state.status, QueryStatus::Loading);
    }

    #[test]
    fn completed_list_is_ready_with_data() {
        let mut cache = cache();
        ready_list(&mut cache, &[todo(1, "one", false), todo(2, "two", true)]);

        let state = cache.query_state(&Query::ListTodos).unwrap();
        assert_eq!(state.status, QueryStatus::Ready);
        let todos = state.data.as_ref().unwrap().as_todos().unwrap();
        assert_eq!(todos.len(), 2);
        assert!(state.error.is_none());
    }

    #[test]
    fn unsubscribing_last_subscriber_evicts() {
        let mut cache = cache();
        let sub = ready_list(&mut cache, &[todo(1, "one", false)]);

        cache.unsubscribe(sub);

        assert!(cache.query_state(&Query::ListTodos).is_none());
        // Registry rows are gone too: invalidating the list tag finds nothing.
        assert!(cache.invalidate(&[Tag::TodoList]).is_empty());
    }

    #[test]
    fn completion_after_eviction_is_dropped() {
        let mut cache = cache();
        let (sub, _request) = cache.subscribe(&Query::ListTodos);
        cache.unsubscribe(sub);

        cache.complete_query(&Query::ListTodos, Ok(list_response(&[todo(1, "late", false)])));

        assert!(cache.query_state(&Query::ListTodos).is_none());
    }

    #[test]
    fn add_todo_invalidates_list_and_returns_refetch() {
        let mut cache = cache();
        let _sub = ready_list(&mut cache, &[]);

        let mutation = Mutation::AddTodo(CreateTodo {
            title: "Buy milk".to_string(),
            completed: false,
            user_id: 1,
        });
        let (outcome, refetches) = cache
            .complete_mutation(&mutation, Ok(created_response(&todo(1, "Buy milk", false))))
            .unwrap();

        assert!(matches!(outcome, MutationOutcome::Created(_)));
        assert_eq!(refetches.len(), 1);
        assert_eq!(refetches[0].0, Query::ListTodos);
        let state = cache.query_state(&Query::ListTodos).unwrap();
        assert_eq!(state.status, QueryStatus::Loading);
        // Stale data survives until the refetch completes.
        assert!(state.data.is_some());
    }

    #[test]
    fn delete_todo_invalidates_list() {
        let mut cache = cache();
        let _sub = ready_list(&mut cache, &[todo(7, "doomed", false)]);

        let response = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let (outcome, refetches) = cache
            .complete_mutation(&Mutation::DeleteTodo(7), Ok(response))
            .unwrap();

        assert_eq!(outcome, MutationOutcome::Deleted);
        assert_eq!(refetches.len(), 1);
        assert_eq!(refetches[0].0, Query::ListTodos);
    }

    #[test]
    fn update_reaches_list_through_per_item_tag() {
        let mut cache = cache();
        let _sub = ready_list(&mut cache, &[todo(5, "toggle me", false)]);

        let mutation = Mutation::UpdateTodo {
            id: 5,
            body: UpdateTodo {
                title: "toggle me".to_string(),
                completed: true,
                user_id: 1,
            },
        };
        let response = HttpResponse {
            status: 200,
            body: serde_json::to_string(&todo(5, "toggle me", true)).unwrap(),
        };
        let (_, refetches) = cache.complete_mutation(&mutation, Ok(response)).unwrap();

        // The list result provided Todo(5), so invalidating it refetches the list.
        assert_eq!(refetches.len(), 1);
        assert_eq!(refetches[0].0, Query::ListTodos);
    }

    #[test]
    fn update_of_unlisted_id_refetches_nothing() {
        let mut cache = cache();
        let _sub = ready_list(&mut cache, &[todo(5, "only five", false)]);

        let mutation = Mutation::UpdateTodo {
            id: 99,
            body: UpdateTodo {
                title: "elsewhere".to_string(),
                completed: true,
                user_id: 1,
            },
        };
        let response = HttpResponse {
            status: 200,
            body: serde_json::to_string(&todo(99, "elsewhere", true)).unwrap(),
        };
        let (_, refetches) = cache.complete_mutation(&mutation, Ok(response)).unwrap();

        assert!(refetches.is_empty());
    }

    #[test]
    fn failed_mutation_leaves_cache_untouched() {
        let mut cache = cache();
        let _sub = ready_list(&mut cache, &[todo(7, "keep me", false)]);

        let response = HttpResponse {
            status: 500,
            body: "boom".to_string(),
        };
        let err = cache
            .complete_mutation(&Mutation::DeleteTodo(7), Ok(response))
            .unwrap_err();

        assert!(matches!(err, ApiError::Http { status: 500, .. }));
        let state = cache.query_state(&Query::ListTodos).unwrap();
        assert_eq!(state.status, QueryStatus::Ready);
        assert_eq!(state.data.as_ref().unwrap().as_todos().unwrap().len(), 1);
    }

    #[test]
    fn transport_error_lands_in_entry_error() {
        let mut cache = cache();
        let (_sub, _request) = cache.subscribe(&Query::ListTodos);

        cache.complete_query(
            &Query::ListTodos,
            Err(ApiError::Transport("connection refused".to_string())),
        );

        let state = cache.query_state(&Query::ListTodos).unwrap();
        assert_eq!(state.status, QueryStatus::Failed);
        assert!(matches!(state.error, Some(ApiError::Transport(_))));
        assert!(state.data.is_none());
    }

    #[test]
    fn failed_list_still_provides_list_tag() {
        let mut cache = cache();
        let (_sub, _request) = cache.subscribe(&Query::ListTodos);
        cache.complete_query(
            &Query::ListTodos,
            Ok(HttpResponse {
                status: 500,
                body: "boom".to_string(),
            }),
        );

        // A later delete must still trigger the list refetch.
        let refetches = cache.invalidate(&[Tag::TodoList]);
        assert_eq!(refetches.len(), 1);
        assert_eq!(refetches[0].0, Query::ListTodos);
    }

    #[test]
    fn refetch_moves_to_loading_and_keeps_data() {
        let mut cache = cache();
        let _sub = ready_list(&mut cache, &[todo(1, "stale", false)]);

        let request = cache.refetch(&Query::ListTodos);

        assert!(request.is_some());
        let state = cache.query_state(&Query::ListTodos).unwrap();
        assert_eq!(state.status, QueryStatus::Loading);
        assert!(state.data.is_some());
    }

    #[test]
    fn refetch_without_subscription_returns_none() {
        let mut cache = cache();
        assert!(cache.refetch(&Query::ListTodos).is_none());
    }

    #[test]
    fn get_todo_entry_is_keyed_by_id() {
        let mut cache = cache();
        let (_sub, request) = cache.subscribe(&Query::GetTodo(5));
        assert!(request.is_some());
        cache.complete_query(
            &Query::GetTodo(5),
            Ok(HttpResponse {
                status: 200,
                body: serde_json::to_string(&todo(5, "five", false)).unwrap(),
            }),
        );

        let state = cache.query_state(&Query::GetTodo(5)).unwrap();
        assert_eq!(state.data.as_ref().unwrap().as_todo().unwrap().id, 5);
        assert!(cache.query_state(&Query::GetTodo(6)).is_none());

        // Updating id 5 refetches the single-record entry.
        let refetches = cache.invalidate(&[Tag::Todo(5)]);
        assert_eq!(refetches.len(), 1);
        assert_eq!(refetches[0].0, Query::GetTodo(5));
    }
}
