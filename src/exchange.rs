//! Exchange identity and per-exchange context storage.
//!
//! An *exchange* is one logical call: a request and its eventual response,
//! or a one-way send. The host creates it when a call begins and disposes
//! of it when the call fully completes. Every frame pass belonging to the
//! call carries the same [`ExchangeId`].
//!
//! [`ExchangeStore`] is the explicit map from exchange identity to whatever
//! a pipeline stage needs to share across passes of the same call. Stored
//! values live until the entry is removed with the exchange, not before.
//!
//! # Example
//!
//! ```
//! use pipetime::exchange::{ExchangeId, ExchangeStore};
//!
//! let store: ExchangeStore<u32> = ExchangeStore::new();
//! let ex = ExchangeId::next();
//!
//! store.put(ex, 7);
//! assert_eq!(store.get(&ex), Some(7));
//!
//! store.remove(&ex);
//! assert_eq!(store.get(&ex), None);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;

/// Process-wide exchange ID generator. 0 is reserved.
static NEXT_EXCHANGE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity for one logical call.
///
/// Stable for the life of the call, cheap to copy, usable as a map key.
/// Hosts that already track their own call identity can wrap it with
/// [`ExchangeId::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExchangeId(u64);

impl ExchangeId {
    /// Allocate the next process-unique exchange ID.
    pub fn next() -> Self {
        Self(NEXT_EXCHANGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a host-assigned identity.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exchange#{}", self.0)
    }
}

/// Map from exchange identity to a per-call value.
///
/// Pipeline passes for a single exchange are causally ordered by the host,
/// so no cross-exchange locking is needed; distinct exchanges may still be
/// processed concurrently on separate threads, which the sharded map
/// handles. [`put_if_absent`](ExchangeStore::put_if_absent) is atomic per
/// key, so the at-most-once-start invariant holds even for hosts that do
/// not serialize passes within one exchange.
#[derive(Debug)]
pub struct ExchangeStore<V> {
    inner: DashMap<ExchangeId, V>,
}

impl<V> ExchangeStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Store a value for an exchange, returning the previous value if any.
    pub fn put(&self, exchange: ExchangeId, value: V) -> Option<V> {
        self.inner.insert(exchange, value)
    }

    /// Insert a value only if the exchange has none yet.
    ///
    /// Returns `true` when the value produced by `make` was inserted,
    /// `false` when an entry already existed (and `make` was never called).
    pub fn put_if_absent(&self, exchange: ExchangeId, make: impl FnOnce() -> V) -> bool {
        match self.inner.entry(exchange) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(make());
                true
            }
        }
    }

    /// Get a mutable guard for an exchange's value.
    pub fn get_mut(&self, exchange: &ExchangeId) -> Option<RefMut<'_, ExchangeId, V>> {
        self.inner.get_mut(exchange)
    }

    /// Remove an exchange's value, returning it if present.
    pub fn remove(&self, exchange: &ExchangeId) -> Option<V> {
        self.inner.remove(exchange).map(|(_, v)| v)
    }

    /// Check whether an exchange has a stored value.
    pub fn contains(&self, exchange: &ExchangeId) -> bool {
        self.inner.contains_key(exchange)
    }

    /// Number of exchanges with stored values.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<V: Clone> ExchangeStore<V> {
    /// Get a clone of an exchange's value.
    pub fn get(&self, exchange: &ExchangeId) -> Option<V> {
        self.inner.get(exchange).map(|v| v.clone())
    }
}

impl<V> Default for ExchangeStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_id_unique() {
        let a = ExchangeId::next();
        let b = ExchangeId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_exchange_id_from_raw() {
        let id = ExchangeId::from_raw(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(id.to_string(), "exchange#42");
    }

    #[test]
    fn test_put_get_remove() {
        let store: ExchangeStore<String> = ExchangeStore::new();
        let ex = ExchangeId::next();

        assert_eq!(store.get(&ex), None);
        assert_eq!(store.put(ex, "first".to_string()), None);
        assert_eq!(store.get(&ex), Some("first".to_string()));

        // Overwrite returns the previous value.
        assert_eq!(store.put(ex, "second".to_string()), Some("first".to_string()));

        assert_eq!(store.remove(&ex), Some("second".to_string()));
        assert!(!store.contains(&ex));
    }

    #[test]
    fn test_put_if_absent_only_first_wins() {
        let store: ExchangeStore<u32> = ExchangeStore::new();
        let ex = ExchangeId::next();

        assert!(store.put_if_absent(ex, || 1));
        assert!(!store.put_if_absent(ex, || 2));
        assert_eq!(store.get(&ex), Some(1));
    }

    #[test]
    fn test_values_isolated_per_exchange() {
        let store: ExchangeStore<u32> = ExchangeStore::new();
        let a = ExchangeId::next();
        let b = ExchangeId::next();

        store.put(a, 10);
        store.put(b, 20);

        assert_eq!(store.get(&a), Some(10));
        assert_eq!(store.get(&b), Some(20));
        assert_eq!(store.len(), 2);

        store.remove(&a);
        assert_eq!(store.get(&b), Some(20));
    }

    #[test]
    fn test_get_mut_in_place() {
        let store: ExchangeStore<Vec<u32>> = ExchangeStore::new();
        let ex = ExchangeId::next();

        store.put(ex, vec![1]);
        store.get_mut(&ex).unwrap().push(2);
        assert_eq!(store.get(&ex), Some(vec![1, 2]));
    }
}
