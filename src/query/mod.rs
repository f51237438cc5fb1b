//! Request/response cache for backend reads.
//!
//! Each [`QueryKey`] owns one entry that moves through
//! `Idle -> Loading -> Success | Error`. Concurrent readers of the same key
//! share a single in-flight fetch. Every fetch is tagged with a generation
//! number; a completion whose generation no longer matches the entry (because
//! the key was invalidated or removed while it was in flight) is handed back
//! to its own callers but never written to the cache.

mod key;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::api::metrics::record_query_cache;
use crate::client::ClientError;

pub use key::QueryKey;

type Value = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<Value, ClientError>>>;

enum Phase {
    Idle,
    Loading,
    Success(Value),
    Error(ClientError),
}

struct Entry {
    phase: Phase,
    generation: u64,
    in_flight: Option<SharedFetch>,
    updated_at: Option<Instant>,
    invalidated: bool,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            in_flight: None,
            updated_at: None,
            invalidated: false,
        }
    }
}

/// What a view sees for a key without triggering a fetch.
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    pub data: Option<Arc<T>>,
    pub is_loading: bool,
    pub is_stale: bool,
    pub error: Option<ClientError>,
}

impl<T> QueryResult<T> {
    fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_stale: false,
            error: None,
        }
    }

    /// Data that can be rendered as-is.
    pub fn fresh_data(&self) -> Option<&Arc<T>> {
        if self.is_stale {
            None
        } else {
            self.data.as_ref()
        }
    }
}

/// Process-wide query cache shared by every view.
pub struct QueryClient {
    entries: DashMap<QueryKey, Entry>,
    generation: AtomicU64,
    stale_after: Option<Duration>,
}

impl QueryClient {
    /// `stale_after` of `None` keeps successful entries until invalidated.
    pub fn new(stale_after: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            stale_after,
        }
    }

    /// Read `key`, serving it from cache when fresh and otherwise running
    /// `fetcher`. `fetcher` only builds the future; it is invoked at most once
    /// per fetch, and not at all when another caller already has a fetch for
    /// this key in flight.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, ClientError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let (fetch, generation) = {
            let mut entry = self.entries.entry(key.clone()).or_default();

            if let Phase::Success(value) = &entry.phase {
                if self.is_fresh(&entry) {
                    if let Ok(data) = value.clone().downcast::<T>() {
                        debug!(key = %key, "Query cache hit");
                        record_query_cache("hit");
                        return Ok(data);
                    }
                }
            }

            if let Some(fetch) = entry.in_flight.clone() {
                debug!(key = %key, "Joining in-flight query");
                record_query_cache("joined");
                (fetch, entry.generation)
            } else {
                let generation = self.next_generation();
                let pending = fetcher();
                let fetch = async move { pending.await.map(|data| Arc::new(data) as Value) }
                    .boxed()
                    .shared();

                entry.generation = generation;
                entry.in_flight = Some(fetch.clone());
                entry.phase = Phase::Loading;

                debug!(key = %key, generation, "Query cache miss, fetching");
                record_query_cache("miss");
                (fetch, generation)
            }
        };

        let result = fetch.await;
        self.settle(&key, generation, &result);

        result?.downcast::<T>().map_err(|_| {
            ClientError::Decode(format!("cached value for {} has an unexpected type", key))
        })
    }

    /// Run a write. On success `on_success` runs (typically to invalidate the
    /// keys that depend on the written record) before the value is returned.
    pub async fn mutate<T, Fut, S>(&self, mutation: Fut, on_success: S) -> Result<T, ClientError>
    where
        Fut: Future<Output = Result<T, ClientError>>,
        S: FnOnce(&Self, &T),
    {
        match mutation.await {
            Ok(value) => {
                on_success(self, &value);
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Mutation failed");
                Err(e)
            }
        }
    }

    /// Mark `key` stale so the next read refetches. A fetch already in flight
    /// for it is detached: its result still reaches its callers but is not
    /// cached.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            self.invalidate_entry(key, &mut entry);
        }
    }

    /// Invalidate every key in `scope`, with or without an identifier.
    pub fn invalidate_scope(&self, scope: &str) {
        for mut item in self.entries.iter_mut() {
            if item.key().scope() == scope {
                let key = item.key().clone();
                self.invalidate_entry(&key, item.value_mut());
            }
        }
    }

    /// Drop `key` entirely, e.g. after the record was deleted.
    pub fn remove(&self, key: &QueryKey) {
        if self.entries.remove(key).is_some() {
            debug!(key = %key, "Query cache entry removed");
        }
    }

    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryResult<T> {
        let Some(entry) = self.entries.get(key) else {
            return QueryResult::idle();
        };

        let is_stale = !self.is_fresh(&entry);
        match &entry.phase {
            Phase::Idle => QueryResult::idle(),
            Phase::Loading => QueryResult {
                is_loading: true,
                ..QueryResult::idle()
            },
            Phase::Success(value) => QueryResult {
                data: value.clone().downcast::<T>().ok(),
                is_loading: entry.in_flight.is_some(),
                is_stale,
                error: None,
            },
            Phase::Error(e) => QueryResult {
                is_loading: entry.in_flight.is_some(),
                error: Some(e.clone()),
                ..QueryResult::idle()
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn settle(&self, key: &QueryKey, generation: u64, result: &Result<Value, ClientError>) {
        let Some(mut entry) = self.entries.get_mut(key) else {
            debug!(key = %key, "Query settled after its entry was removed, discarding");
            return;
        };

        if entry.generation != generation {
            debug!(
                key = %key,
                generation,
                current = entry.generation,
                "Discarding superseded query result"
            );
            return;
        }
        // Joined callers settle the same fetch again
        if entry.in_flight.take().is_none() {
            return;
        }

        entry.updated_at = Some(Instant::now());
        entry.invalidated = false;
        entry.phase = match result {
            Ok(value) => Phase::Success(value.clone()),
            Err(e) => Phase::Error(e.clone()),
        };
    }

    fn invalidate_entry(&self, key: &QueryKey, entry: &mut Entry) {
        entry.invalidated = true;
        if entry.in_flight.take().is_some() {
            entry.generation = self.next_generation();
            entry.phase = Phase::Idle;
        }
        debug!(key = %key, "Query invalidated");
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        if entry.invalidated {
            return false;
        }
        match (self.stale_after, entry.updated_at) {
            (Some(max_age), Some(updated_at)) => updated_at.elapsed() < max_age,
            _ => true,
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(None)
    }
}
