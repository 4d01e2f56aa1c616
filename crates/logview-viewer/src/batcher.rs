/*
[INPUT]:  Items pushed at arbitrary rate, an injected frame scheduler
[OUTPUT]: Ordered batches delivered at most once per frame tick, or on demand
[POS]:    Rendering pipeline - update-rate decoupling (generic, record-agnostic)
[UPDATE]: When changing flush scheduling, cancellation, or scheduler backends
*/

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tracing::{debug, trace};

/// Fallback tick used outside a render loop.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub type FrameCallback = Box<dyn FnOnce() + Send + 'static>;

/// "Run this callback once, at the next frame."
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self, callback: FrameCallback);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Arc<S> {
    fn request_frame(&self, callback: FrameCallback) {
        (**self).request_frame(callback)
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Frame callbacks drained by a render loop, once per drawn frame.
///
/// Callbacks requested while a frame is running land in the next frame.
#[derive(Clone, Default)]
pub struct FrameQueue {
    callbacks: Arc<Mutex<Vec<FrameCallback>>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        lock(&self.callbacks).len()
    }

    /// Run every callback requested before this frame started.
    pub fn run_frame(&self) -> usize {
        let callbacks = std::mem::take(&mut *lock(&self.callbacks));
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) {
        lock(&self.callbacks).push(callback);
    }
}

impl std::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Fixed-interval timer scheduler for contexts without a render loop.
#[derive(Debug, Clone, Copy)]
pub struct IntervalScheduler {
    period: Duration,
}

impl IntervalScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl FrameScheduler for IntervalScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        let period = self.period;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(period).await;
                    callback();
                });
            }
            Err(_) => {
                std::thread::spawn(move || {
                    std::thread::sleep(period);
                    callback();
                });
            }
        }
    }
}

/// Counters describing delivered batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub flushes: u64,
    pub items: u64,
    pub largest_batch: usize,
}

struct BatchState<T> {
    pending: Vec<T>,
    /// Generation of the outstanding scheduled tick, if any.
    scheduled: Option<u64>,
    generation: u64,
    closed: bool,
    stats: BatchStats,
    on_flush: Box<dyn FnMut(Vec<T>) + Send>,
}

impl<T> BatchState<T> {
    fn deliver(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let batch = std::mem::take(&mut self.pending);
        let size = batch.len();
        self.stats.flushes += 1;
        self.stats.items += size as u64;
        self.stats.largest_batch = self.stats.largest_batch.max(size);
        (self.on_flush)(batch);
        size
    }

    fn close(&mut self) -> usize {
        if self.closed {
            return 0;
        }
        self.closed = true;
        self.scheduled = None;
        let dropped = self.pending.len();
        self.pending.clear();
        debug!(
            dropped,
            flushes = self.stats.flushes,
            items = self.stats.items,
            "frame batcher closed"
        );
        dropped
    }
}

/// Closes a batcher from outside the task that owns it.
///
/// Once `close` returns, no pending or later item reaches the flush callback.
#[derive(Clone)]
pub struct BatchCloser {
    close: Arc<dyn Fn() -> usize + Send + Sync>,
}

impl BatchCloser {
    /// Same contract as [`FrameBatcher::close`]; zero once the batcher is gone.
    pub fn close(&self) -> usize {
        (self.close)()
    }
}

impl std::fmt::Debug for BatchCloser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCloser").finish_non_exhaustive()
    }
}

/// Coalesces pushed items into one flush callback per frame tick.
///
/// The flush callback runs while the batcher's lock is held, which serializes
/// flushes in formation order. It must not call back into the same batcher.
pub struct FrameBatcher<T> {
    shared: Arc<Mutex<BatchState<T>>>,
    scheduler: Arc<dyn FrameScheduler>,
}

impl<T: Send + 'static> FrameBatcher<T> {
    /// Batcher ticking on the fixed-interval fallback scheduler.
    pub fn new<F>(on_flush: F) -> Self
    where
        F: FnMut(Vec<T>) + Send + 'static,
    {
        Self::with_scheduler(on_flush, Arc::new(IntervalScheduler::default()))
    }

    pub fn with_scheduler<F>(on_flush: F, scheduler: Arc<dyn FrameScheduler>) -> Self
    where
        F: FnMut(Vec<T>) + Send + 'static,
    {
        Self {
            shared: Arc::new(Mutex::new(BatchState {
                pending: Vec::new(),
                scheduled: None,
                generation: 0,
                closed: false,
                stats: BatchStats::default(),
                on_flush: Box::new(on_flush),
            })),
            scheduler,
        }
    }

    /// Queue an item, scheduling one flush if none is outstanding.
    pub fn push(&self, item: T) {
        let generation = {
            let mut state = lock(&self.shared);
            if state.closed {
                trace!("push on closed batcher ignored");
                return;
            }
            state.pending.push(item);
            if state.scheduled.is_some() {
                return;
            }
            state.generation += 1;
            state.scheduled = Some(state.generation);
            state.generation
        };

        // Requested outside the lock: a scheduler may run the callback inline.
        let weak = Arc::downgrade(&self.shared);
        self.scheduler
            .request_frame(Box::new(move || Self::scheduled_flush(&weak, generation)));
    }

    /// Handle that can close this batcher from another task or thread.
    pub fn closer(&self) -> BatchCloser {
        let weak = Arc::downgrade(&self.shared);
        BatchCloser {
            close: Arc::new(move || {
                weak.upgrade()
                    .map(|shared| lock(&shared).close())
                    .unwrap_or(0)
            }),
        }
    }

    fn scheduled_flush(weak: &Weak<Mutex<BatchState<T>>>, generation: u64) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut state = lock(&shared);
        if state.scheduled != Some(generation) {
            trace!(generation, "stale frame tick ignored");
            return;
        }
        state.scheduled = None;
        state.deliver();
    }
}

impl<T> FrameBatcher<T> {
    /// Deliver everything pending right now. Any outstanding tick becomes a no-op.
    pub fn flush_now(&self) -> usize {
        let mut state = lock(&self.shared);
        state.scheduled = None;
        state.deliver()
    }

    /// Tear down: discard pending items and ignore later pushes and ticks.
    ///
    /// Returns the number of discarded items; zero when already closed.
    pub fn close(&self) -> usize {
        lock(&self.shared).close()
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.shared).pending.len()
    }

    pub fn is_scheduled(&self) -> bool {
        lock(&self.shared).scheduled.is_some()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.shared).closed
    }

    pub fn stats(&self) -> BatchStats {
        lock(&self.shared).stats
    }
}

impl<T> Drop for FrameBatcher<T> {
    fn drop(&mut self) {
        self.close();
    }
}
