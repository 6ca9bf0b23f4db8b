//! Todo operations over the record store.
//!
//! # Design
//! `Todos` is the only code that interprets bytes in the `todos` bucket.
//! Each public method runs in exactly one transaction: lookups and
//! aggregates in a read-only one, mutations in a read-write one. Ids arrive
//! as text because they come straight from submitted form fields.

use tracing::debug;

use crate::error::TodoError;
use crate::store::{encode_u64, Store, WriteTx};
use crate::tables::TODOS;
use crate::types::Todo;

/// Todo list operations bound to a store handle.
#[derive(Clone)]
pub struct Todos {
    store: Store,
}

impl Todos {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a todo with the given label, assigning the next id.
    pub fn create(&self, label: &str) -> Result<Todo, TodoError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(TodoError::EmptyLabel);
        }

        let todo = self.store.update(|tx| {
            let todo = Todo {
                id: tx.next_sequence(TODOS)?,
                done: false,
                label: label.to_string(),
            };
            write(tx, &todo)?;
            Ok::<_, TodoError>(todo)
        })?;
        debug!(id = todo.id, "created todo");
        Ok(todo)
    }

    /// Flip `done` on one todo and return the updated record.
    pub fn toggle(&self, id: &str) -> Result<Todo, TodoError> {
        let id = parse_id(id)?;
        self.store.update(|tx| {
            let bytes = tx
                .get(TODOS, &encode_u64(id))?
                .ok_or(TodoError::NotFound(id))?;
            let mut todo = decode(&bytes)?;
            todo.done = !todo.done;
            write(tx, &todo)?;
            Ok(todo)
        })
    }

    /// Flip `done` on every todo in a single transaction.
    pub fn toggle_all(&self) -> Result<(), TodoError> {
        self.store.update(|tx| {
            let mut todos = Vec::new();
            tx.for_each(TODOS, |_, value| {
                todos.push(decode(value)?);
                Ok::<_, TodoError>(())
            })?;
            for mut todo in todos {
                todo.done = !todo.done;
                write(tx, &todo)?;
            }
            Ok(())
        })
    }

    /// Remove a todo. Removing an id that does not exist succeeds.
    pub fn delete(&self, id: &str) -> Result<(), TodoError> {
        let id = parse_id(id)?;
        self.store.update(|tx| {
            tx.delete(TODOS, &encode_u64(id))?;
            Ok::<_, TodoError>(())
        })?;
        debug!(id, "deleted todo");
        Ok(())
    }

    /// Every todo in ascending id order.
    pub fn list(&self) -> Result<Vec<Todo>, TodoError> {
        self.store.view(|tx| {
            let mut todos = Vec::new();
            tx.for_each(TODOS, |_, value| {
                todos.push(decode(value)?);
                Ok::<_, TodoError>(())
            })?;
            Ok(todos)
        })
    }

    pub fn get(&self, id: &str) -> Result<Todo, TodoError> {
        let id = parse_id(id)?;
        self.store.view(|tx| {
            let bytes = tx
                .get(TODOS, &encode_u64(id))?
                .ok_or(TodoError::NotFound(id))?;
            decode(&bytes)
        })
    }

    /// Number of todos not yet done.
    pub fn count_incomplete(&self) -> Result<usize, TodoError> {
        self.store.view(|tx| {
            let mut count = 0;
            tx.for_each(TODOS, |_, value| {
                if !decode(value)?.done {
                    count += 1;
                }
                Ok::<_, TodoError>(())
            })?;
            Ok(count)
        })
    }

    /// True when no todo is left undone, including when there are none.
    pub fn all_done(&self) -> Result<bool, TodoError> {
        Ok(self.count_incomplete()? == 0)
    }
}

fn parse_id(text: &str) -> Result<u64, TodoError> {
    text.trim()
        .parse()
        .map_err(|_| TodoError::InvalidId(text.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Todo, TodoError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn write(tx: &WriteTx, todo: &Todo) -> Result<(), TodoError> {
    let bytes = serde_json::to_vec(todo)?;
    tx.put(TODOS, &encode_u64(todo.id), &bytes)?;
    Ok(())
}
