//! Query and mutation cache keyed by logical resource identity.
//!
//! # Design
//! `QueryClient` is an explicit context object: build one at startup and
//! pass clones to whatever needs cached data. Clones share one table.
//!
//! Each key moves `absent -> pending -> {ready, errored}` and re-enters
//! `pending` when it is invalidated or refetched. Reads of a key whose fetch
//! is in flight share that fetch. Every fetch is tagged with the key's
//! generation; invalidation bumps the generation, so a response that was
//! already in flight is discarded instead of overwriting newer state.
//!
//! Keys never expire on their own. Only an invalidation, a manual refetch,
//! or a polling schedule fetches an existing key again, and failed fetches
//! are not retried.
//!
//! All fetches run on spawned Tokio tasks, so the methods that may start
//! one must be called from within a Tokio runtime.

mod key;
mod mutation;
mod state;
mod subscription;

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ApiError;

pub use key::CacheKey;
pub use mutation::Mutation;
pub use state::{QuerySnapshot, QueryStatus};
pub use subscription::QuerySubscription;

type ErasedValue = Arc<dyn Any + Send + Sync>;
type ErasedFetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<ErasedValue, ApiError>> + Send + Sync>;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

struct Slot {
    status: QueryStatus,
    data: Option<ErasedValue>,
    error: Option<ApiError>,
    generation: u64,
    /// A fetch for `generation` is in flight.
    fetching: bool,
    /// The next read should fetch.
    stale: bool,
    fetcher: Option<ErasedFetcher>,
    subscribers: usize,
    poller: Option<CancellationToken>,
    version: watch::Sender<u64>,
}

impl Slot {
    fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            status: QueryStatus::Pending,
            data: None,
            error: None,
            generation: 0,
            fetching: false,
            stale: true,
            fetcher: None,
            subscribers: 0,
            poller: None,
            version,
        }
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    fn snapshot<T: Clone + 'static>(&self, key: &CacheKey) -> QuerySnapshot<T> {
        let data = self.data.as_ref().and_then(|value| {
            let typed = value.downcast_ref::<T>().cloned();
            if typed.is_none() {
                warn!(%key, "cached value has a different type than requested");
            }
            typed
        });
        QuerySnapshot {
            status: self.status,
            data,
            error: self.error.clone(),
            is_fetching: self.fetching,
        }
    }
}

#[derive(Clone, Default)]
pub struct QueryClient {
    slots: Arc<DashMap<CacheKey, Slot>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot of `key`, or `None` if it was never read or written.
    pub fn snapshot<T: Clone + 'static>(&self, key: &CacheKey) -> Option<QuerySnapshot<T>> {
        self.slots.get(key).map(|slot| slot.snapshot(key))
    }

    pub fn get_query_data<T: Clone + 'static>(&self, key: &CacheKey) -> Option<T> {
        self.snapshot(key).and_then(|snapshot| snapshot.data)
    }

    /// Returns the cached snapshot for `key`, starting `fetcher` first if the
    /// key is absent or stale and no fetch is already running.
    pub fn query<T, F, Fut>(&self, key: CacheKey, fetcher: F) -> QuerySnapshot<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let mut slot = self.slots.entry(key.clone()).or_insert_with(Slot::new);
        slot.fetcher = Some(erase(fetcher));
        if slot.stale && !slot.fetching {
            self.start_fetch(&key, &mut slot);
        }
        slot.snapshot(&key)
    }

    /// Like `query`, but keeps the key active until the returned handle is
    /// dropped and lets the caller await changes.
    pub fn subscribe<T, F, Fut>(&self, key: CacheKey, fetcher: F) -> QuerySubscription<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let version = {
            let mut slot = self.slots.entry(key.clone()).or_insert_with(Slot::new);
            slot.fetcher = Some(erase(fetcher));
            slot.subscribers += 1;
            if slot.stale && !slot.fetching {
                self.start_fetch(&key, &mut slot);
            }
            slot.version.subscribe()
        };
        QuerySubscription::new(self.clone(), key, version)
    }

    /// Resolves with the settled value of `key`, joining an in-flight fetch
    /// if there is one.
    pub async fn fetch_query<T, F, Fut>(&self, key: CacheKey, fetcher: F) -> Result<T, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let mut subscription = self.subscribe(key, fetcher);
        let snapshot = subscription.settled().await;
        match (snapshot.data, snapshot.error) {
            (Some(data), _) => Ok(data),
            (None, Some(err)) => Err(err),
            (None, None) => Err(ApiError::Deserialization(format!(
                "no value of the requested type cached under {}",
                subscription.key()
            ))),
        }
    }

    /// `subscribe` plus a background refetch every `every` while any
    /// subscriber remains. One schedule runs per key; later calls for a key
    /// that is already polled reuse the existing schedule.
    pub fn poll<T, F, Fut>(&self, key: CacheKey, fetcher: F, every: Duration) -> QuerySubscription<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let subscription = self.subscribe(key.clone(), fetcher);
        let token = match self.slots.get_mut(&key) {
            Some(mut slot) if slot.poller.is_none() => {
                let token = CancellationToken::new();
                slot.poller = Some(token.clone());
                Some(token)
            }
            _ => None,
        };
        if let Some(token) = token {
            debug!(%key, ?every, "polling started");
            tokio::spawn(poll_loop(self.clone(), key, every, token));
        }
        subscription
    }

    /// Marks every key under `prefix` stale and supersedes fetches in flight.
    /// Keys with subscribers refetch at once; the rest refetch on next read.
    pub fn invalidate(&self, prefix: &CacheKey) {
        for mut entry in self.slots.iter_mut() {
            let (key, slot) = entry.pair_mut();
            if !key.starts_with(prefix) {
                continue;
            }
            slot.generation += 1;
            slot.fetching = false;
            slot.stale = true;
            debug!(%key, generation = slot.generation, "invalidated");
            if slot.subscribers > 0 {
                self.start_fetch(key, slot);
            } else {
                slot.notify();
            }
        }
    }

    /// Starts a fetch of `key` with its last fetcher unless one is already
    /// running. Returns whether a fetch was started.
    pub fn refetch(&self, key: &CacheKey) -> bool {
        match self.slots.get_mut(key) {
            Some(mut slot) if !slot.fetching => self.start_fetch(key, &mut slot),
            _ => false,
        }
    }

    /// Overwrites the value under `key` with `update(current)` and marks it
    /// ready. A fetch already in flight still lands afterwards.
    pub fn set_query_data<T, U>(&self, key: CacheKey, update: U)
    where
        T: Send + Sync + 'static,
        U: FnOnce(Option<&T>) -> T,
    {
        let mut slot = self.slots.entry(key).or_insert_with(Slot::new);
        let next = update(slot.data.as_ref().and_then(|value| value.downcast_ref::<T>()));
        slot.data = Some(Arc::new(next));
        slot.status = QueryStatus::Ready;
        slot.error = None;
        slot.notify();
    }

    /// Awaits `mutation`; on success applies `effects` (invalidations first,
    /// then appends) and returns the result. A failure leaves the cache
    /// untouched.
    pub async fn mutate<T, Fut>(&self, mutation: Fut, effects: &Mutation) -> Result<T, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let value = mutation.await?;
        for key in &effects.invalidates {
            self.invalidate(key);
        }
        for key in &effects.appends_to {
            self.set_query_data(key.clone(), |current: Option<&Vec<T>>| {
                let mut list = current.cloned().unwrap_or_default();
                list.push(value.clone());
                list
            });
        }
        Ok(value)
    }

    fn start_fetch(&self, key: &CacheKey, slot: &mut Slot) -> bool {
        let Some(fetcher) = slot.fetcher.clone() else {
            return false;
        };
        slot.fetching = true;
        slot.stale = false;
        slot.status = QueryStatus::Pending;
        slot.notify();

        let generation = slot.generation;
        debug!(%key, generation, "fetch started");
        let client = self.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let result = fetcher().await;
            client.settle(&key, generation, result);
        });
        true
    }

    fn settle(&self, key: &CacheKey, generation: u64, result: Result<ErasedValue, ApiError>) {
        let Some(mut slot) = self.slots.get_mut(key) else {
            return;
        };
        if slot.generation != generation {
            debug!(%key, generation, current = slot.generation, "discarding superseded fetch");
            return;
        }
        slot.fetching = false;
        match result {
            Ok(value) => {
                debug!(%key, generation, "fetch settled");
                slot.status = QueryStatus::Ready;
                slot.data = Some(value);
                slot.error = None;
            }
            Err(err) => {
                debug!(%key, generation, error = %err, "fetch failed");
                slot.status = QueryStatus::Errored;
                slot.data = None;
                slot.error = Some(err);
            }
        }
        slot.notify();
    }

    pub(crate) fn unsubscribe(&self, key: &CacheKey) {
        if let Some(mut slot) = self.slots.get_mut(key) {
            slot.subscribers = slot.subscribers.saturating_sub(1);
            if slot.subscribers == 0 {
                if let Some(token) = slot.poller.take() {
                    debug!(%key, "last subscriber left; polling stopped");
                    token.cancel();
                }
            }
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self, key: &CacheKey) -> usize {
        self.slots.get(key).map_or(0, |slot| slot.subscribers)
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("keys", &self.slots.len())
            .finish()
    }
}

fn erase<T, F, Fut>(fetcher: F) -> ErasedFetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        async move { fut.await.map(|value| Arc::new(value) as ErasedValue) }.boxed()
    })
}

async fn poll_loop(client: QueryClient, key: CacheKey, every: Duration, token: CancellationToken) {
    let every = every.max(MIN_POLL_INTERVAL);
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                client.refetch(&key);
            }
        }
    }
}
