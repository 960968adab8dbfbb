//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the backend's schema but are defined independently of
//! the mock-server crate; integration tests catch schema drift. The backend
//! serializes `user_id` as `userId`, so every payload carries the rename.

use serde::{Deserialize, Serialize};

/// A single todo record returned by the API.
///
/// `id` is server-assigned and immutable; the client never picks one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

/// Request payload for replacing an existing todo.
///
/// The update endpoint is a full-record replace: every field is required and
/// the record on the server takes exactly this shape (plus its id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: String,
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_user_id_as_camel_case() {
        let todo = Todo {
            id: 3,
            title: "Test".to_string(),
            completed: false,
            user_id: 1,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["userId"], 1);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn create_todo_defaults_completed_to_false() {
        let input: CreateTodo =
            serde_json::from_str(r#"{"title":"No completed field","userId":1}"#).unwrap();
        assert_eq!(input.title, "No completed field");
        assert!(!input.completed);
        assert_eq!(input.user_id, 1);
    }

    #[test]
    fn update_todo_requires_all_fields() {
        let result: Result<UpdateTodo, _> = serde_json::from_str(r#"{"title":"Partial"}"#);
        assert!(result.is_err());
    }
}
