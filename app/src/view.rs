//! The single-screen todo view.
//!
//! # Design
//! `TodoView` is the host side of the core's sans-IO boundary: every user
//! action maps to a cache call, and any `HttpRequest` the cache hands back
//! is executed synchronously through the `Transport` before the action
//! returns. Under a scripted fake transport the whole screen is
//! deterministic, which is how the tests below exercise it.
//!
//! State per region, mirroring the backend-driven UI it fronts:
//! - add-form: the not-yet-submitted text plus an `adding` flag; a
//!   whitespace-only submit is rejected before any request is built.
//! - list region: read straight from the cache entry for `ListTodos`;
//!   at most [`MAX_VISIBLE_ROWS`] rows are ever rendered.
//! - rows: toggle issues a full-record replace with `completed` flipped;
//!   delete shares a single `deleting` flag across all rows.
//!
//! Mutation failures are logged and otherwise invisible; only a failed list
//! fetch is rendered (inline, in place of the rows).

use todoq_core::{
    ApiError, CreateTodo, Mutation, MutationOutcome, Query, QueryCache, QueryStatus,
    SubscriptionId, Todo, TodoClient, UpdateTodo,
};

use crate::transport::Transport;

/// Upper bound on rendered rows, regardless of how many records the list
/// fetch returned.
pub const MAX_VISIBLE_ROWS: usize = 10;

/// The user every new todo is filed under.
const DEFAULT_USER_ID: u64 = 1;

pub struct TodoView<T: Transport> {
    transport: T,
    cache: QueryCache,
    /// Held for the lifetime of the screen; released by [`TodoView::close`].
    list_subscription: SubscriptionId,
    input: String,
    adding: bool,
    deleting: bool,
}

impl<T: Transport> TodoView<T> {
    /// Build the view and perform the auto-triggered initial list fetch.
    pub fn new(transport: T, base_url: &str) -> Self {
        let mut cache = QueryCache::new(TodoClient::new(base_url));
        let (list_subscription, request) = cache.subscribe(&Query::ListTodos);
        let mut view = Self {
            transport,
            cache,
            list_subscription,
            input: String::new(),
            adding: false,
            deleting: false,
        };
        if let Some(request) = request {
            let result = view.transport.execute(&request);
            view.cache.complete_query(&Query::ListTodos, result);
        }
        view
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// The submit button's enabled state.
    pub fn can_submit(&self) -> bool {
        !self.adding && !self.input.trim().is_empty()
    }

    /// Submit the add-form. Whitespace-only input is ignored even when
    /// forced past the disabled button. Success clears the field; failure
    /// leaves it unchanged so the user can retry.
    pub fn submit_add(&mut self) {
        if self.adding || self.input.trim().is_empty() {
            return;
        }
        self.adding = true;
        let mutation = Mutation::AddTodo(CreateTodo {
            title: self.input.clone(),
            completed: false,
            user_id: DEFAULT_USER_ID,
        });
        match self.run_mutation(&mutation) {
            Ok(_) => self.input.clear(),
            Err(err) => tracing::error!(%err, "failed to add todo"),
        }
        self.adding = false;
    }

    /// Flip the completed flag of the todo at `row` (index into the visible
    /// rows) via a full-record replace; title and user stay as they are.
    pub fn toggle(&mut self, row: usize) {
        let Some(todo) = self.visible_todos().get(row).cloned() else {
            return;
        };
        let id = todo.id;
        let mutation = Mutation::UpdateTodo {
            id,
            body: UpdateTodo {
                title: todo.title,
                completed: !todo.completed,
                user_id: todo.user_id,
            },
        };
        if let Err(err) = self.run_mutation(&mutation) {
            tracing::error!(%err, id, "failed to update todo");
        }
    }

    /// Delete the todo at `row`. One shared flag debounces all delete
    /// buttons uniformly.
    pub fn delete(&mut self, row: usize) {
        if self.deleting {
            return;
        }
        let Some(id) = self.visible_todos().get(row).map(|todo| todo.id) else {
            return;
        };
        self.deleting = true;
        if let Err(err) = self.run_mutation(&Mutation::DeleteTodo(id)) {
            tracing::error!(%err, id, "failed to delete todo");
        }
        self.deleting = false;
    }

    /// The manual refresh button.
    pub fn refresh(&mut self) {
        if let Some(request) = self.cache.refetch(&Query::ListTodos) {
            let result = self.transport.execute(&request);
            self.cache.complete_query(&Query::ListTodos, result);
        }
    }

    /// The rows the screen shows: the first [`MAX_VISIBLE_ROWS`] records,
    /// or nothing while loading without data or after a failed fetch.
    pub fn visible_todos(&self) -> &[Todo] {
        let Some(state) = self.cache.query_state(&Query::ListTodos) else {
            return &[];
        };
        if state.status == QueryStatus::Failed {
            return &[];
        }
        match state.data.as_ref().and_then(|data| data.as_todos()) {
            Some(todos) => &todos[..todos.len().min(MAX_VISIBLE_ROWS)],
            None => &[],
        }
    }

    /// Render the screen to a string. The binary prints it; tests assert on it.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("== todos ==\n");
        out.push_str(&format!("new: [{}]\n", self.input));
        let Some(state) = self.cache.query_state(&Query::ListTodos) else {
            return out;
        };
        match state.status {
            QueryStatus::Loading if state.data.is_none() => out.push_str("loading todos...\n"),
            QueryStatus::Failed => {
                let message = state
                    .error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "unknown error".to_string());
                out.push_str(&format!("error loading todos: {message}\n"));
            }
            _ => {
                let todos = self.visible_todos();
                if todos.is_empty() {
                    out.push_str("no todos found, add one above\n");
                } else {
                    for (row, todo) in todos.iter().enumerate() {
                        let mark = if todo.completed { 'x' } else { ' ' };
                        out.push_str(&format!("{:>2}. [{mark}] {}\n", row + 1, todo.title));
                    }
                }
            }
        }
        out
    }

    /// Tear down the screen, releasing the list subscription (and with it
    /// the cache entry).
    pub fn close(mut self) {
        self.cache.unsubscribe(self.list_subscription);
    }

    fn run_mutation(&mut self, mutation: &Mutation) -> Result<MutationOutcome, ApiError> {
        let request = self.cache.start_mutation(mutation)?;
        let result = self.transport.execute(&request);
        let (outcome, refetches) = self.cache.complete_mutation(mutation, result)?;
        for (query, request) in refetches {
            let result = self.transport.execute(&request);
            self.cache.complete_query(&query, result);
        }
        Ok(outcome)
    }
}
