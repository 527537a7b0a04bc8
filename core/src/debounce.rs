use std::time::Duration;

use rapid_async_utils::sleep_or_cancel;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::trace;

/// Delays an action until no newer value has been scheduled for `delay`.
///
/// Each [`schedule`](Self::schedule) cancels the pending timer and bumps the
/// generation. The callback receives the generation it was scheduled with so
/// receivers can drop fires that raced a later `schedule` or `cancel`.
pub struct Debouncer<T> {
    generation: u64,
    pending: Option<PendingFire>,
    _value: std::marker::PhantomData<fn(T)>,
}

struct PendingFire {
    cancellation_token: CancellationToken,
    _handle: AbortOnDropHandle<()>,
}

/// Debounces typed input before it becomes a fetch.
pub type QueryDebouncer = Debouncer<String>;

impl<T: Send + 'static> Debouncer<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            pending: None,
            _value: std::marker::PhantomData,
        }
    }

    /// Restart the timer for `value`. Returns the generation handed to
    /// `on_fire`.
    pub fn schedule<F>(&mut self, value: T, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64, T) + Send + 'static,
    {
        self.cancel();
        let generation = self.generation;
        let cancellation_token = CancellationToken::new();
        let child = cancellation_token.child_token();
        let handle = tokio::spawn(async move {
            if sleep_or_cancel(delay, &child).await.is_ok() {
                on_fire(generation, value);
            } else {
                trace!(generation, "debounced fire cancelled");
            }
        });
        self.pending = Some(PendingFire {
            cancellation_token,
            _handle: AbortOnDropHandle::new(handle),
        });
        generation
    }

    /// Drop any pending fire.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            pending.cancellation_token.cancel();
        }
    }

    /// True when `generation` belongs to the most recent `schedule` and no
    /// `cancel` happened since. Clears the pending slot on success.
    pub fn accept(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.pending = None;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T: Send + 'static> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new()
    }
}
