//! Bucket definitions for the todo store.
//!
//! Every bucket maps raw byte keys to raw byte values. Numeric keys are
//! encoded with [`encode_u64`](crate::store::encode_u64) so that byte order
//! matches numeric order.

use redb::TableDefinition;

use crate::store::Bucket;

/// Todo records keyed by big-endian id, JSON values.
pub const TODOS: Bucket = TableDefinition::new("todos");

/// Page-level values for the index page (the visit counter).
pub const INDEX: Bucket = TableDefinition::new("index");

/// Every bucket the application expects to exist after startup.
pub const ALL: [Bucket; 2] = [TODOS, INDEX];

/// Internal: last issued sequence value per bucket name.
pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("$sequences");
