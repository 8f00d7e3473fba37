//! Settles a fast-changing value after a quiet period.
//!
//! Every [`Debouncer::observe`] call cancels the pending commit and schedules a
//! new one, so the published value is always the last input that stayed
//! unchanged for the whole delay. Commits run on the Tokio runtime the
//! debouncer is used from.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Settle delay used when a list view does not configure one.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);

pub struct Debouncer<T> {
    delay: Duration,
    settled: Arc<watch::Sender<T>>,
    pending: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (settled, _) = watch::channel(initial);
        Self {
            delay,
            settled: Arc::new(settled),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Feeds a new raw value and restarts the settle timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn observe(&mut self, value: T) {
        self.cancel();

        let settled = Arc::clone(&self.settled);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            publish(&settled, value);
        }));
    }

    /// Commits `value` immediately, dropping any pending commit.
    pub fn settle_now(&mut self, value: T) {
        self.cancel();
        publish(&self.settled, value);
    }

    /// Drops the pending commit, if any. The settled value is left untouched.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a commit is still scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Current settled value.
    pub fn settled(&self) -> T {
        self.settled.borrow().clone()
    }

    /// Receiver notified every time the settled value changes.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.subscribe()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

fn publish<T: PartialEq>(settled: &watch::Sender<T>, value: T) {
    settled.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}
