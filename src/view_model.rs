//! Remote list view model: query state, result cache and fetch status of one
//! admin table.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;

use crate::cache::{QueryCache, QueryKey};
use crate::debounce::DEFAULT_DEBOUNCE;
use crate::domain::resource::{ListResource, Resource};
use crate::pagination::{PageNav, PageWindow, PaginatedResult};
use crate::query::{EffectiveParams, FilterValue, QueryController};
use crate::repository::ResourceReader;
use crate::repository::errors::{GENERIC_ERROR_MESSAGE, RepositoryError, RepositoryResult};

/// How long a cached page is served without a background refetch.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListSettings {
    pub debounce: Duration,
    pub stale_time: Duration,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            stale_time: DEFAULT_STALE_TIME,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListStatus {
    /// Nothing requested yet.
    Idle,
    /// First request in flight, nothing to show.
    Loading,
    Success,
    /// Last request failed. Previously loaded rows stay visible.
    Error,
    /// A request is in flight while earlier rows stay visible.
    Refetching,
}

/// What a table renders.
#[derive(Debug)]
pub struct ListSnapshot<T> {
    pub status: ListStatus,
    pub data: Option<Arc<PaginatedResult<T>>>,
    pub error: Option<String>,
}

impl<T> Clone for ListSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T> ListSnapshot<T> {
    pub fn rows(&self) -> &[T] {
        self.data
            .as_deref()
            .map(|page| page.data.as_slice())
            .unwrap_or_default()
    }

    /// Last page reported by the displayed result, 1 when nothing is loaded.
    pub fn last_page(&self) -> usize {
        self.data.as_ref().map_or(1, |page| page.last_page)
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.status, ListStatus::Loading | ListStatus::Refetching)
    }
}

struct Binding<T> {
    ticket: u64,
    disposed: bool,
    active: Option<QueryKey>,
    status: ListStatus,
    data: Option<Arc<PaginatedResult<T>>>,
    error: Option<String>,
}

impl<T> Binding<T> {
    fn snapshot(&self) -> ListSnapshot<T> {
        ListSnapshot {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

/// Binds parameters to the shared [`QueryCache`] and a [`ResourceReader`].
///
/// Only the most recently requested parameters may update what the view
/// shows. Responses for older parameters still land in the cache under their
/// own key.
pub struct ListOrchestrator<T> {
    resource: &'static Resource,
    reader: Arc<dyn ResourceReader>,
    cache: QueryCache,
    stale_time: Duration,
    binding: Arc<Mutex<Binding<T>>>,
}

impl<T> Clone for ListOrchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource,
            reader: Arc::clone(&self.reader),
            cache: self.cache.clone(),
            stale_time: self.stale_time,
            binding: Arc::clone(&self.binding),
        }
    }
}

impl<T: ListResource> ListOrchestrator<T> {
    pub fn new(reader: Arc<dyn ResourceReader>, cache: QueryCache, stale_time: Duration) -> Self {
        Self {
            resource: T::RESOURCE,
            reader,
            cache,
            stale_time,
            binding: Arc::new(Mutex::new(Binding {
                ticket: 0,
                disposed: false,
                active: None,
                status: ListStatus::Idle,
                data: None,
                error: None,
            })),
        }
    }

    fn binding(&self) -> MutexGuard<'_, Binding<T>> {
        self.binding.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn resource(&self) -> &'static Resource {
        self.resource
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.binding().snapshot()
    }

    /// Parameters the view currently shows or waits for.
    pub fn active_params(&self) -> Option<EffectiveParams> {
        self.binding().active.as_ref().map(|key| key.params.clone())
    }

    /// Makes `params` the active request and resolves it.
    ///
    /// A fresh cached page is shown without a network call. A stale one is
    /// shown while it is refetched. When another request for the same key
    /// supersedes this one, its outcome is bound instead. Returns the
    /// snapshot after the request settled, which may belong to a newer
    /// request issued meanwhile.
    pub async fn fetch(&self, params: EffectiveParams) -> ListSnapshot<T> {
        let key = QueryKey::new(self.resource.name, params);
        let cached = self.cache.get::<PaginatedResult<T>>(&key);

        let ticket = {
            let mut binding = self.binding();
            if binding.disposed {
                log::debug!("Skipping `{}` fetch for a disposed view", self.resource.name);
                return binding.snapshot();
            }
            binding.ticket += 1;
            binding.active = Some(key.clone());

            match cached {
                Some(cached) if cached.is_fresh(self.stale_time) => {
                    log::debug!("Serving cached `{}` page", self.resource.name);
                    binding.status = ListStatus::Success;
                    binding.data = Some(cached.value);
                    binding.error = None;
                    return binding.snapshot();
                }
                Some(cached) => {
                    binding.data = Some(cached.value);
                    binding.status = ListStatus::Refetching;
                }
                None if binding.data.is_some() => binding.status = ListStatus::Refetching,
                None => binding.status = ListStatus::Loading,
            }
            binding.error = None;
            binding.ticket
        };

        let token = self.cache.begin_fetch(&key);
        let result = self.load(&key.params).await;

        match result {
            Ok(page) => {
                let page = Arc::new(page);
                if !self.cache.commit(&key, token, Arc::clone(&page)) {
                    log::debug!("`{}` response superseded by a newer request", self.resource.name);
                    return self.follow(&key, ticket).await;
                }

                let mut binding = self.binding();
                if binding.ticket == ticket {
                    binding.status = ListStatus::Success;
                    binding.data = Some(page);
                    binding.error = None;
                } else {
                    log::debug!(
                        "Cached `{}` response for parameters no longer shown",
                        self.resource.name
                    );
                }
                binding.snapshot()
            }
            Err(err) => {
                if !self.cache.abandon(&key, token, err.user_message()) {
                    log::debug!("Superseded `{}` request failed: {err}", self.resource.name);
                    return self.follow(&key, ticket).await;
                }

                let mut binding = self.binding();
                if binding.ticket == ticket {
                    log::error!("Failed to load `{}` list: {err}", self.resource.name);
                    binding.status = ListStatus::Error;
                    binding.error = Some(err.user_message());
                }
                binding.snapshot()
            }
        }
    }

    /// Waits for the newer request on `key` that superseded this one, which
    /// may come from another view sharing the cache, and binds its outcome.
    async fn follow(&self, key: &QueryKey, ticket: u64) -> ListSnapshot<T> {
        let moved_on = self.binding().ticket != ticket;
        if moved_on {
            return self.snapshot();
        }

        if let Some(mut settled) = self.cache.subscribe(key) {
            while self.cache.is_pending(key) {
                if settled.changed().await.is_err() {
                    break;
                }
            }
        }
        let outcome = self.cache.outcome::<PaginatedResult<T>>(key);

        let mut binding = self.binding();
        if binding.ticket != ticket {
            return binding.snapshot();
        }
        match outcome {
            Some(Ok(cached)) => {
                binding.status = ListStatus::Success;
                binding.data = Some(cached.value);
                binding.error = None;
            }
            Some(Err(message)) => {
                binding.status = ListStatus::Error;
                binding.error = Some(message);
            }
            None => {
                log::warn!("Cached `{}` entry vanished while waiting", self.resource.name);
                binding.status = ListStatus::Error;
                binding.error = Some(GENERIC_ERROR_MESSAGE.to_string());
            }
        }
        binding.snapshot()
    }

    async fn load(&self, params: &EffectiveParams) -> RepositoryResult<PaginatedResult<T>> {
        let rows = self.reader.list(self.resource.endpoint, params).await?;
        rows.try_map(serde_json::from_value)
            .map_err(RepositoryError::from)
    }

    /// Marks every cached page of this resource stale.
    pub fn invalidate(&self) -> usize {
        self.cache.invalidate(self.resource.name)
    }

    /// Runs `mutation`; on success invalidates the resource and refetches the
    /// active parameters. Failures leave the cache untouched.
    pub async fn mutate<R, F>(&self, mutation: F) -> RepositoryResult<R>
    where
        F: Future<Output = RepositoryResult<R>>,
    {
        let outcome = mutation.await;

        match &outcome {
            Ok(_) => {
                self.invalidate();
                if let Some(params) = self.active_params() {
                    self.fetch(params).await;
                }
            }
            Err(err) => log::warn!("Mutation on `{}` failed: {err}", self.resource.name),
        }

        outcome
    }

    /// Releases the view: pending responses no longer reach the binding and
    /// later fetches are ignored.
    pub fn dispose(&self) {
        let mut binding = self.binding();
        binding.disposed = true;
        binding.ticket += 1;
        binding.active = None;
    }
}

/// One admin table: a [`QueryController`] driving a [`ListOrchestrator`].
pub struct ListViewModel<T> {
    controller: QueryController,
    orchestrator: ListOrchestrator<T>,
}

impl<T: ListResource> ListViewModel<T> {
    /// Must be called from within a Tokio runtime.
    pub fn new(
        reader: Arc<dyn ResourceReader>,
        cache: QueryCache,
        settings: &ListSettings,
    ) -> Self {
        Self {
            controller: QueryController::new(T::RESOURCE, settings.debounce),
            orchestrator: ListOrchestrator::new(reader, cache, settings.stale_time),
        }
    }

    pub fn controller(&self) -> &QueryController {
        &self.controller
    }

    pub fn orchestrator(&self) -> &ListOrchestrator<T> {
        &self.orchestrator
    }

    pub fn set_free_text(&mut self, text: impl Into<String>) {
        self.controller.set_free_text(text);
    }

    pub fn set_filter(&mut self, name: &str, value: impl Into<FilterValue>) -> bool {
        self.controller.set_filter(name, value)
    }

    pub fn clear_filter(&mut self, name: &str) -> bool {
        self.controller.clear_filter(name)
    }

    pub fn set_page(&mut self, page: usize) {
        self.controller.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.controller.set_page_size(page_size);
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Current page against the last page of the displayed result.
    pub fn nav(&self) -> PageNav {
        PageNav::new(
            self.controller.query().page,
            self.orchestrator.snapshot().last_page(),
        )
    }

    pub fn next_page(&mut self) {
        let page = self.nav().next();
        self.controller.set_page(page);
    }

    pub fn prev_page(&mut self) {
        let page = self.nav().prev();
        self.controller.set_page(page);
    }

    /// Moves to `page`, clamped to the known page range.
    pub fn jump_to(&mut self, page: usize) {
        let page = self.nav().jump(page);
        self.controller.set_page(page);
    }

    pub fn page_window(&self) -> PageWindow {
        self.nav().window()
    }

    pub fn effective_params(&self) -> EffectiveParams {
        self.controller.effective_params()
    }

    /// Receiver woken once typed search text settles.
    pub fn subscribe_search(&self) -> watch::Receiver<String> {
        self.controller.subscribe_search()
    }

    /// Fetches the current effective parameters.
    pub async fn refresh(&self) -> ListSnapshot<T> {
        self.orchestrator.fetch(self.controller.effective_params()).await
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.orchestrator.snapshot()
    }

    pub async fn mutate<R, F>(&self, mutation: F) -> RepositoryResult<R>
    where
        F: Future<Output = RepositoryResult<R>>,
    {
        self.orchestrator.mutate(mutation).await
    }

    /// Cancels the pending search commit and detaches in-flight requests.
    pub fn dispose(&mut self) {
        self.controller.dispose();
        self.orchestrator.dispose();
    }
}
