//! Page-view counter stored under a fixed key in the `index` bucket.

use crate::error::StoreError;
use crate::store::{decode_u64, encode_u64, Store};
use crate::tables::INDEX;

const COUNTER_KEY: &[u8] = b"index_count";

/// A single durable integer. Absent means zero.
#[derive(Clone)]
pub struct Counter {
    store: Store,
}

impl Counter {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn read(&self) -> Result<u64, StoreError> {
        self.store.view(|tx| match tx.get(INDEX, COUNTER_KEY)? {
            Some(bytes) => decode_u64(&bytes),
            None => Ok(0),
        })
    }

    /// Add one and return the new value.
    ///
    /// The read and the write share one write transaction, so concurrent
    /// callers never observe the same prior value.
    pub fn increment(&self) -> Result<u64, StoreError> {
        self.store.update(|tx| {
            let current = match tx.get(INDEX, COUNTER_KEY)? {
                Some(bytes) => decode_u64(&bytes)?,
                None => 0,
            };
            let next = current.checked_add(1).ok_or_else(|| {
                StoreError::CounterOverflow(String::from_utf8_lossy(COUNTER_KEY).into_owned())
            })?;
            tx.put(INDEX, COUNTER_KEY, &encode_u64(next))?;
            Ok(next)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::tables::ALL;

    fn counter() -> Counter {
        Counter::new(Store::in_memory(&ALL).unwrap())
    }

    #[test]
    fn absent_counter_reads_zero() {
        assert_eq!(counter().read().unwrap(), 0);
    }

    #[test]
    fn increment_returns_new_value() {
        let counter = counter();
        assert_eq!(counter.increment().unwrap(), 1);
        assert_eq!(counter.increment().unwrap(), 2);
        assert_eq!(counter.read().unwrap(), 2);
    }

    #[test]
    fn sequential_increments_sum_exactly() {
        let counter = counter();
        for _ in 0..25 {
            counter.increment().unwrap();
        }
        assert_eq!(counter.read().unwrap(), 25);
    }

    #[test]
    fn concurrent_increments_never_lose_updates() {
        let counter = counter();
        let mut observed: Vec<u64> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let counter = counter.clone();
                    scope.spawn(move || {
                        (0..20)
                            .map(|_| counter.increment().unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect()
        });

        assert_eq!(counter.read().unwrap(), 160);
        observed.sort_unstable();
        assert_eq!(observed, (1..=160).collect::<Vec<_>>());
    }

    #[test]
    fn malformed_counter_value_is_reported() {
        let counter = counter();
        counter
            .store
            .update(|tx| tx.put(INDEX, COUNTER_KEY, b"xx"))
            .unwrap();
        assert!(matches!(counter.read(), Err(StoreError::MalformedInteger(2))));
        assert!(matches!(counter.increment(), Err(StoreError::MalformedInteger(2))));
    }

    #[test]
    fn increment_at_maximum_fails_and_keeps_value() {
        let counter = counter();
        counter
            .store
            .update(|tx| tx.put(INDEX, COUNTER_KEY, &encode_u64(u64::MAX)))
            .unwrap();
        assert!(matches!(
            counter.increment(),
            Err(StoreError::CounterOverflow(key)) if key == "index_count"
        ));
        assert_eq!(counter.read().unwrap(), u64::MAX);
    }
}
