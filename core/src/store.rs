//! Transactional record store on top of redb.
//!
//! # Design
//! A [`Store`] is a cheap handle (`Arc<Database>`) built once at startup and
//! cloned into every component that needs storage. All access goes through
//! closures run inside a transaction:
//!
//! - [`Store::view`] opens a read-only transaction over the latest committed
//!   snapshot. Any number of these may run in parallel.
//! - [`Store::update`] opens a read-write transaction. redb admits one writer
//!   at a time, so updates are serialized. The transaction commits only if
//!   the closure returns `Ok`; on `Err` it is aborted and nothing it wrote,
//!   including sequence bumps, becomes visible.
//!
//! Buckets are redb tables with byte keys and byte values. Callers own the
//! meaning of the bytes; the store only guarantees ascending key order on
//! iteration.

use std::path::Path;
use std::sync::Arc;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition, TableHandle};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::tables::SEQUENCES;

/// A namespaced collection of key/value byte pairs.
pub type Bucket = TableDefinition<'static, &'static [u8], &'static [u8]>;

/// Encode an integer as a fixed-width big-endian key.
pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode a key or value produced by [`encode_u64`].
pub fn decode_u64(bytes: &[u8]) -> Result<u64, StoreError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::MalformedInteger(bytes.len()))?;
    Ok(u64::from_be_bytes(raw))
}

/// Shared handle to the embedded database.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open (or create) the database file at `path` and make sure every
    /// bucket in `buckets` exists.
    pub fn open(path: impl AsRef<Path>, buckets: &[Bucket]) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let db = Database::create(path)?;
        debug!(path = %path.display(), "opened record store");
        Self::init(db, buckets)
    }

    /// A store that lives only in memory. Used by tests.
    pub fn in_memory(buckets: &[Bucket]) -> Result<Self, StoreError> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::init(db, buckets)
    }

    fn init(db: Database, buckets: &[Bucket]) -> Result<Self, StoreError> {
        let txn = db.begin_write()?;
        {
            txn.open_table(SEQUENCES)?;
            for bucket in buckets {
                txn.open_table(*bucket)?;
            }
        }
        txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Run `f` inside a read-only transaction.
    pub fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&ReadTx) -> Result<T, E>,
    {
        let tx = ReadTx {
            txn: self.db.begin_read().map_err(StoreError::from)?,
        };
        f(&tx)
    }

    /// Run `f` inside a read-write transaction, committing only on `Ok`.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&WriteTx) -> Result<T, E>,
    {
        let tx = WriteTx {
            txn: self.db.begin_write().map_err(StoreError::from)?,
        };
        match f(&tx) {
            Ok(value) => {
                tx.txn.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(abort) = tx.txn.abort() {
                    warn!(error = %abort, "failed to abort write transaction");
                }
                Err(err)
            }
        }
    }
}

/// A read-only transaction, valid for the duration of a [`Store::view`] call.
pub struct ReadTx {
    txn: redb::ReadTransaction,
}

impl ReadTx {
    pub fn get(&self, bucket: Bucket, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let table = self.txn.open_table(bucket)?;
        get_from(&table, key)
    }

    /// Visit every pair in `bucket` in ascending key order.
    pub fn for_each<E, F>(&self, bucket: Bucket, f: F) -> Result<(), E>
    where
        E: From<StoreError>,
        F: FnMut(&[u8], &[u8]) -> Result<(), E>,
    {
        let table = self.txn.open_table(bucket).map_err(StoreError::from)?;
        scan(&table, f)
    }
}

/// A read-write transaction, valid for the duration of a [`Store::update`] call.
pub struct WriteTx {
    txn: redb::WriteTransaction,
}

impl WriteTx {
    pub fn get(&self, bucket: Bucket, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let table = self.txn.open_table(bucket)?;
        get_from(&table, key)
    }

    /// Visit every pair in `bucket` in ascending key order.
    ///
    /// The bucket stays open while `f` runs, so `f` must not write to it.
    /// Collect first and write afterwards.
    pub fn for_each<E, F>(&self, bucket: Bucket, f: F) -> Result<(), E>
    where
        E: From<StoreError>,
        F: FnMut(&[u8], &[u8]) -> Result<(), E>,
    {
        let table = self.txn.open_table(bucket).map_err(StoreError::from)?;
        scan(&table, f)
    }

    pub fn put(&self, bucket: Bucket, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut table = self.txn.open_table(bucket)?;
        table.insert(key, value)?;
        Ok(())
    }

    /// Remove `key` from `bucket`. Removing an absent key is a no-op.
    pub fn delete(&self, bucket: Bucket, key: &[u8]) -> Result<(), StoreError> {
        let mut table = self.txn.open_table(bucket)?;
        table.remove(key)?;
        Ok(())
    }

    /// Issue the next value of the bucket's sequence, starting at 1.
    ///
    /// The new value is persisted with the transaction, so once committed it
    /// is never issued again, even if the record that used it is deleted.
    pub fn next_sequence(&self, bucket: Bucket) -> Result<u64, StoreError> {
        let name = bucket.name();
        let mut table = self.txn.open_table(SEQUENCES)?;
        let current = table.get(name)?.map(|last| last.value()).unwrap_or(0);
        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::SequenceExhausted(name.to_string()))?;
        table.insert(name, next)?;
        Ok(next)
    }
}

fn get_from<T>(table: &T, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    Ok(table.get(key)?.map(|value| value.value().to_vec()))
}

fn scan<T, E, F>(table: &T, mut f: F) -> Result<(), E>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
    E: From<StoreError>,
    F: FnMut(&[u8], &[u8]) -> Result<(), E>,
{
    for entry in table.iter().map_err(StoreError::from)? {
        let (key, value) = entry.map_err(StoreError::from)?;
        f(key.value(), value.value())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGETS: Bucket = TableDefinition::new("widgets");
    const GADGETS: Bucket = TableDefinition::new("gadgets");

    fn store() -> Store {
        Store::in_memory(&[WIDGETS, GADGETS]).unwrap()
    }

    fn keys(store: &Store, bucket: Bucket) -> Vec<u64> {
        store
            .view(|tx| {
                let mut out = Vec::new();
                tx.for_each(bucket, |key, _| {
                    out.push(decode_u64(key)?);
                    Ok::<_, StoreError>(())
                })?;
                Ok::<_, StoreError>(out)
            })
            .unwrap()
    }

    #[test]
    fn encoded_order_matches_numeric_order() {
        let values = [0u64, 1, 255, 256, 65_535, 65_536, u64::MAX];
        for pair in values.windows(2) {
            assert!(encode_u64(pair[0]) < encode_u64(pair[1]), "{pair:?}");
        }
        assert_eq!(decode_u64(&encode_u64(256)).unwrap(), 256);
    }

    #[test]
    fn decode_rejects_wrong_width() {
        let err = decode_u64(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, StoreError::MalformedInteger(3)));
    }

    #[test]
    fn get_put_delete() {
        let store = store();
        store
            .update(|tx| tx.put(WIDGETS, b"a", b"alpha"))
            .unwrap();

        let value = store.view(|tx| tx.get(WIDGETS, b"a")).unwrap();
        assert_eq!(value.as_deref(), Some(&b"alpha"[..]));

        store.update(|tx| tx.delete(WIDGETS, b"a")).unwrap();
        assert!(store.view(|tx| tx.get(WIDGETS, b"a")).unwrap().is_none());

        // deleting again is fine
        store.update(|tx| tx.delete(WIDGETS, b"a")).unwrap();
    }

    #[test]
    fn buckets_are_independent() {
        let store = store();
        store.update(|tx| tx.put(WIDGETS, b"k", b"w")).unwrap();
        assert!(store.view(|tx| tx.get(GADGETS, b"k")).unwrap().is_none());
    }

    #[test]
    fn sequences_are_per_bucket_and_strictly_increasing() {
        let store = store();
        let issued: Vec<u64> = (0..3)
            .map(|_| store.update(|tx| tx.next_sequence(WIDGETS)).unwrap())
            .collect();
        assert_eq!(issued, vec![1, 2, 3]);
        assert_eq!(store.update(|tx| tx.next_sequence(GADGETS)).unwrap(), 1);
    }

    #[test]
    fn failed_update_leaves_no_trace() {
        let store = store();
        let result: Result<(), StoreError> = store.update(|tx| {
            let id = tx.next_sequence(WIDGETS)?;
            tx.put(WIDGETS, &encode_u64(id), b"half written")?;
            Err(StoreError::MalformedInteger(0))
        });
        assert!(result.is_err());

        assert!(keys(&store, WIDGETS).is_empty());
        // the aborted sequence bump was rolled back too
        assert_eq!(store.update(|tx| tx.next_sequence(WIDGETS)).unwrap(), 1);
    }

    #[test]
    fn for_each_visits_keys_in_numeric_order() {
        let store = store();
        store
            .update(|tx| {
                for id in [300u64, 2, 256, 1, 255] {
                    tx.put(WIDGETS, &encode_u64(id), b"")?;
                }
                Ok::<_, StoreError>(())
            })
            .unwrap();
        assert_eq!(keys(&store, WIDGETS), vec![1, 2, 255, 256, 300]);
    }

    #[test]
    fn for_each_stops_on_callback_error() {
        let store = store();
        store
            .update(|tx| {
                for id in 1u64..=5 {
                    tx.put(WIDGETS, &encode_u64(id), b"")?;
                }
                Ok::<_, StoreError>(())
            })
            .unwrap();

        let mut seen = 0;
        let result = store.view(|tx| {
            tx.for_each(WIDGETS, |_, _| {
                seen += 1;
                if seen == 2 {
                    return Err(StoreError::MalformedInteger(0));
                }
                Ok(())
            })
        });
        assert!(result.is_err());
        assert_eq!(seen, 2);
    }

    #[test]
    fn writes_are_visible_inside_their_transaction() {
        let store = store();
        store.update(|tx| tx.put(WIDGETS, b"k", b"v1")).unwrap();
        let inside = store
            .update(|tx| {
                tx.put(WIDGETS, b"k", b"v2")?;
                tx.get(WIDGETS, b"k")
            })
            .unwrap();
        assert_eq!(inside.as_deref(), Some(&b"v2"[..]));
        let after = store.view(|tx| tx.get(WIDGETS, b"k")).unwrap();
        assert_eq!(after.as_deref(), Some(&b"v2"[..]));
    }
}
