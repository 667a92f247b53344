use std::marker::PhantomData;

use tokio::sync::watch;

use super::key::CacheKey;
use super::state::{QuerySnapshot, QueryStatus};
use super::QueryClient;

/// A registered interest in one cache key.
///
/// While at least one subscription exists for a key, invalidation refetches
/// it immediately and any polling schedule keeps running. Dropping the last
/// one stops polling.
pub struct QuerySubscription<T> {
    client: QueryClient,
    key: CacheKey,
    version: watch::Receiver<u64>,
    _value: PhantomData<fn() -> T>,
}

impl<T> QuerySubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(client: QueryClient, key: CacheKey, version: watch::Receiver<u64>) -> Self {
        Self {
            client,
            key,
            version,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn snapshot(&self) -> QuerySnapshot<T> {
        self.client
            .snapshot(&self.key)
            .unwrap_or_else(QuerySnapshot::pending)
    }

    /// Waits for the next change notification on this key.
    pub async fn changed(&mut self) -> QuerySnapshot<T> {
        // An error means the client was dropped; nothing will change again.
        let _ = self.version.changed().await;
        self.version.borrow_and_update();
        self.snapshot()
    }

    /// Returns as soon as the key is not `Pending`.
    pub async fn settled(&mut self) -> QuerySnapshot<T> {
        loop {
            self.version.borrow_and_update();
            let snapshot = self.snapshot();
            if snapshot.status != QueryStatus::Pending {
                return snapshot;
            }
            if self.version.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    /// Starts a fetch unless one is already in flight.
    pub fn refetch(&self) -> bool {
        self.client.refetch(&self.key)
    }
}

impl<T> Drop for QuerySubscription<T> {
    fn drop(&mut self) {
        self.client.unsubscribe(&self.key);
    }
}

impl<T> std::fmt::Debug for QuerySubscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySubscription")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
