//! Domain records persisted by the todo store.

use serde::{Deserialize, Serialize};

/// A single task on the todo list.
///
/// `id` is issued once from the bucket sequence and never reused. Only
/// `done` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: u64,
    pub done: bool,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_with_tagged_fields() {
        let todo = Todo {
            id: 1,
            done: false,
            label: "Buy milk".to_string(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["done"], false);
        assert_eq!(json["label"], "Buy milk");
    }

    #[test]
    fn todo_rejects_missing_label() {
        let result: Result<Todo, _> = serde_json::from_str(r#"{"id":1,"done":true}"#);
        assert!(result.is_err());
    }
}
