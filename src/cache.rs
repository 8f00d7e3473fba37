//! Result cache shared by every list view.
//!
//! Entries are keyed by resource namespace plus [`EffectiveParams`]. Each
//! entry also remembers the token of its newest in-flight request, so a
//! response that lost the race to a later request for the same key is never
//! written over the newer data. Settled entries idle for longer than the
//! garbage collection window are evicted when the next request starts.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::query::EffectiveParams;

/// How long a settled entry is kept after its last request.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(300);

/// Cache key: the namespace a mutation invalidates plus the exact request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: &'static str,
    pub params: EffectiveParams,
}

impl QueryKey {
    pub fn new(resource: &'static str, params: EffectiveParams) -> Self {
        Self { resource, params }
    }
}

/// Identifies one request issued through [`QueryCache::begin_fetch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchToken(u64);

/// A stored result with its bookkeeping.
#[derive(Debug)]
pub struct Cached<T> {
    pub value: Arc<T>,
    pub fetched_at: Instant,
    pub invalidated: bool,
}

impl<T> Cached<T> {
    /// Usable without a background refetch.
    pub fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

struct Entry {
    value: Option<(Arc<dyn Any + Send + Sync>, Instant)>,
    invalidated: bool,
    pending: Option<u64>,
    // Set when the namespace was invalidated while `pending` was in flight.
    pending_invalidated: bool,
    // User message of the newest request, when it failed.
    failure: Option<String>,
    touched_at: Instant,
    settled: watch::Sender<u64>,
}

impl Entry {
    fn new() -> Self {
        Self {
            value: None,
            invalidated: false,
            pending: None,
            pending_invalidated: false,
            failure: None,
            touched_at: Instant::now(),
            settled: watch::Sender::new(0),
        }
    }

    fn settle(&mut self) {
        self.pending = None;
        self.pending_invalidated = false;
        self.touched_at = Instant::now();
        self.settled.send_modify(|generation| *generation += 1);
    }

    fn cached<T: Send + Sync + 'static>(&self) -> Option<Cached<T>> {
        let (value, fetched_at) = self.value.as_ref()?;
        let value = Arc::clone(value).downcast::<T>().ok()?;

        Some(Cached {
            value,
            fetched_at: *fetched_at,
            invalidated: self.invalidated,
        })
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    next_token: u64,
}

impl CacheState {
    fn collect_garbage(&mut self, gc_time: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.pending.is_some() || entry.touched_at.elapsed() < gc_time);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("Evicted {evicted} idle cache entries");
        }
        evicted
    }
}

#[derive(Clone)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
    gc_time: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_gc_time(DEFAULT_GC_TIME)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose settled entries are dropped `gc_time` after their last
    /// request. Entries with a request in flight are always kept.
    pub fn with_gc_time(gc_time: Duration) -> Self {
        Self {
            state: Arc::default(),
            gc_time,
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stored value for `key`, if one of type `T` is present.
    pub fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Cached<T>> {
        self.state().entries.get(key)?.cached()
    }

    /// How the newest settled request for `key` ended: the stored value, or
    /// the message it failed with.
    pub fn outcome<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
    ) -> Option<Result<Cached<T>, String>> {
        let state = self.state();
        let entry = state.entries.get(key)?;
        match &entry.failure {
            Some(message) => Some(Err(message.clone())),
            None => entry.cached().map(Ok),
        }
    }

    /// Registers a new request for `key`, superseding any earlier one.
    /// Idle entries past the garbage collection window are evicted first.
    pub fn begin_fetch(&self, key: &QueryKey) -> FetchToken {
        let mut state = self.state();
        state.collect_garbage(self.gc_time);
        state.next_token += 1;
        let token = state.next_token;

        let entry = state.entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.pending = Some(token);
        entry.pending_invalidated = false;
        entry.touched_at = Instant::now();

        FetchToken(token)
    }

    /// Whether `token` is still the newest request for `key`.
    pub fn is_latest(&self, key: &QueryKey, token: FetchToken) -> bool {
        self.state()
            .entries
            .get(key)
            .is_some_and(|entry| entry.pending == Some(token.0))
    }

    pub fn is_pending(&self, key: &QueryKey) -> bool {
        self.state()
            .entries
            .get(key)
            .is_some_and(|entry| entry.pending.is_some())
    }

    /// Receiver woken every time a request for `key` is committed or fails
    /// as the newest one. `None` when nothing is known about `key`.
    pub fn subscribe(&self, key: &QueryKey) -> Option<watch::Receiver<u64>> {
        self.state()
            .entries
            .get(key)
            .map(|entry| entry.settled.subscribe())
    }

    /// Stores the response of `token`. Returns `false`, leaving the entry
    /// untouched, when a newer request for the same key has been issued.
    pub fn commit<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        token: FetchToken,
        value: Arc<T>,
    ) -> bool {
        let mut state = self.state();
        let Some(entry) = state.entries.get_mut(key) else {
            return false;
        };
        if entry.pending != Some(token.0) {
            return false;
        }

        let value: Arc<dyn Any + Send + Sync> = value;
        entry.value = Some((value, Instant::now()));
        entry.invalidated = entry.pending_invalidated;
        entry.failure = None;
        entry.settle();
        true
    }

    /// Records that `token` failed with `message`. Returns whether it was
    /// still the newest request; older failures are dropped.
    pub fn abandon(&self, key: &QueryKey, token: FetchToken, message: impl Into<String>) -> bool {
        let mut state = self.state();
        let Some(entry) = state.entries.get_mut(key) else {
            return false;
        };
        if entry.pending != Some(token.0) {
            return false;
        }

        entry.failure = Some(message.into());
        entry.settle();
        true
    }

    /// Marks every entry of `resource` stale, including responses still in
    /// flight. Returns the number of entries touched.
    pub fn invalidate(&self, resource: &str) -> usize {
        let mut state = self.state();
        let mut touched = 0;

        for (key, entry) in state.entries.iter_mut() {
            if key.resource != resource {
                continue;
            }
            entry.invalidated = true;
            if entry.pending.is_some() {
                entry.pending_invalidated = true;
            }
            touched += 1;
        }

        log::debug!("Invalidated {touched} cached `{resource}` entries");
        touched
    }

    /// Drops settled entries idle for longer than the garbage collection
    /// window. Returns the number evicted.
    pub fn collect_garbage(&self) -> usize {
        self.state().collect_garbage(self.gc_time)
    }

    pub fn clear(&self) {
        self.state().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
