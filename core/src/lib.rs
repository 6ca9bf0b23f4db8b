//! Storage core for the todo server.
//!
//! # Overview
//! A transactional key/value [`Store`] on redb, and the two families of
//! operations the pages call into: [`Todos`] (create, toggle, delete, list,
//! aggregates) and the page-view [`Counter`]. Nothing here knows about HTTP.
//!
//! # Design
//! - One `Store` is opened at startup and cloned into every consumer; clones
//!   share the same database.
//! - Every operation runs in its own transaction. Reads use read-only
//!   transactions and may run concurrently; writes are serialized.
//! - Numeric keys are fixed-width big-endian, so bucket iteration already
//!   yields ascending ids.

pub mod counter;
pub mod error;
pub mod store;
pub mod tables;
pub mod todos;
pub mod types;

pub use counter::Counter;
pub use error::{StoreError, TodoError};
pub use store::{Bucket, ReadTx, Store, WriteTx};
pub use todos::Todos;
pub use types::Todo;
