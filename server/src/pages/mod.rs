//! Page definitions served by the two dispatchers.
//!
//! Each page is the shared [`layout`] followed by its own source, in that
//! order, so a page may override a layout fragment by redefining it.

pub mod index;
pub mod layout;
pub mod todos;

use crate::templates::Source;

/// Sources for the visit-counter page (every path but `/todos`).
pub const INDEX: [Source; 2] = [layout::SOURCE, index::SOURCE];

/// Sources for the todo list at `/todos`.
pub const TODOS: [Source; 2] = [layout::SOURCE, todos::SOURCE];
