//! Runtime-driven auto-save controller
//!
//! Owns the timers for one [`SaveTracker`]: every scheduling tick spawns a
//! sleep task on the tokio runtime captured at construction, and the task
//! asks the tracker whether it may persist once the quiet period elapsed.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::hooks::SaveHooks;
use super::options::AutoSaveOptions;
use super::status::{AttemptOutcome, SaveStatus};
use super::tracker::{FireDecision, ObserveAction, SaveTracker};
use crate::core::{AutoSaveError, ChangeDetector, Persist, StructuralEq};

/// Bookkeeping guarded by the controller lock.
///
/// `timer` is the sleep task for the tracker's pending attempt. A timer that
/// proceeds to persist removes itself first, so aborting `timer` never
/// interrupts a running save.
struct Inner<T> {
    tracker: SaveTracker<T>,
    timer: Option<JoinHandle<()>>,
}

impl<T> Inner<T> {
    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// State shared between the handle, its timer tasks and watch drivers.
pub(super) struct Shared<T, P: Persist<T>, D> {
    persister: P,
    detector: D,
    hooks: SaveHooks<P::Error>,
    delay: Duration,
    enabled: AtomicBool,
    saving: AtomicBool,
    runtime: Handle,
    inner: Mutex<Inner<T>>,
    status: watch::Sender<SaveStatus>,
    closed: watch::Sender<bool>,
}

impl<T, P: Persist<T>, D> Shared<T, P, D> {
    fn teardown(&self) {
        let cancelled = {
            let mut inner = self.inner.lock();
            let cancelled = inner.tracker.close();
            inner.abort_timer();
            cancelled
        };
        self.closed.send_replace(true);
        debug!(cancelled = ?cancelled, "auto-save torn down");
    }

    pub(super) fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub(super) fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    pub(super) fn runtime(&self) -> &Handle {
        &self.runtime
    }

    fn set_saving(&self, saving: bool) {
        self.saving.store(saving, Ordering::SeqCst);
        self.status.send_modify(|status| status.saving = saving);
    }

    fn record(&self, outcome: AttemptOutcome) {
        self.status.send_modify(|status| status.record(outcome));
    }
}

impl<T, P, D> Shared<T, P, D>
where
    T: Clone + Send + Sync + 'static,
    P: Persist<T>,
    D: ChangeDetector<T>,
{
    pub(super) fn observe(self: &Arc<Self>, value: T) {
        let enabled = self.enabled.load(Ordering::SeqCst);
        let mut inner = self.inner.lock();

        match inner.tracker.observe(value, enabled, &self.detector) {
            ObserveAction::Baseline => trace!("baseline recorded"),
            ObserveAction::Disabled => trace!("auto-save disabled, tick ignored"),
            ObserveAction::Unchanged { cancelled: None } => trace!("value unchanged"),
            ObserveAction::Unchanged {
                cancelled: Some(generation),
            } => {
                inner.abort_timer();
                debug!(generation, "value back at baseline, pending save cancelled");
            }
            ObserveAction::Schedule {
                generation,
                replaced,
            } => {
                inner.abort_timer();
                if let Some(replaced) = replaced {
                    trace!(replaced, "pending save superseded");
                }

                let shared = Arc::clone(self);
                let delay = self.delay;
                inner.timer = Some(self.runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    shared.fire(generation).await;
                }));
                debug!(generation, delay_ms = delay.as_millis() as u64, "save scheduled");
            }
            ObserveAction::Closed => debug!("tick after teardown ignored"),
        }
    }

    async fn fire(self: Arc<Self>, generation: u64) {
        let decision = {
            let mut inner = self.inner.lock();
            let decision = inner.tracker.fire(generation);
            if !matches!(decision, FireDecision::Stale | FireDecision::Closed) {
                // This task owns `timer`; detach it so later ticks cannot abort the save.
                inner.timer = None;
            }
            if matches!(decision, FireDecision::Run(_)) {
                self.set_saving(true);
            }
            decision
        };

        match decision {
            FireDecision::Run(snapshot) => {
                self.run(snapshot).await;
            }
            FireDecision::Skipped => {
                debug!(generation, "save already running, attempt skipped");
                self.record(AttemptOutcome::Skipped);
            }
            FireDecision::Stale | FireDecision::Clean | FireDecision::Closed => {
                trace!(generation, "timer fired with nothing to do");
            }
        }
    }

    async fn flush(&self) -> Result<Option<AttemptOutcome>, AutoSaveError> {
        let decision = {
            let mut inner = self.inner.lock();
            let decision = inner.tracker.flush(&self.detector);
            match decision {
                FireDecision::Run(_) => {
                    inner.abort_timer();
                    self.set_saving(true);
                }
                FireDecision::Clean => inner.abort_timer(),
                // A running save leaves the pending attempt armed.
                FireDecision::Skipped | FireDecision::Stale | FireDecision::Closed => {}
            }
            decision
        };

        match decision {
            FireDecision::Run(snapshot) => Ok(Some(self.run(snapshot).await)),
            FireDecision::Skipped => {
                debug!("flush while a save is running, skipped");
                self.record(AttemptOutcome::Skipped);
                Ok(Some(AttemptOutcome::Skipped))
            }
            FireDecision::Stale | FireDecision::Clean => Ok(None),
            FireDecision::Closed => Err(AutoSaveError::Closed),
        }
    }

    /// Persist `snapshot`.
    ///
    /// The caller must already hold the tracker's in-flight guard and have
    /// published `saving`. Both are released together under the controller
    /// lock, before any hook runs.
    async fn run(&self, snapshot: T) -> AttemptOutcome {
        let mut guard = InFlight {
            shared: self,
            armed: true,
        };

        let result = self.persister.persist(&snapshot).await;
        guard.armed = false;

        let outcome = {
            let mut inner = self.inner.lock();
            let outcome = match &result {
                Ok(()) => {
                    inner.tracker.complete_success(snapshot);
                    AttemptOutcome::Succeeded
                }
                Err(_) => {
                    inner.tracker.complete_failure();
                    AttemptOutcome::Failed
                }
            };
            self.saving.store(false, Ordering::SeqCst);
            self.status.send_modify(|status| {
                status.saving = false;
                status.record(outcome);
            });
            outcome
        };

        match result {
            Ok(()) => {
                debug!("auto-save succeeded");
                self.hooks.succeeded();
            }
            Err(error) => {
                warn!(%error, "auto-save failed");
                self.hooks.failed(&error);
            }
        }
        outcome
    }
}

/// Releases the in-flight guard if a save future is dropped or panics
/// before the persister returns.
struct InFlight<'a, T, P: Persist<T>, D> {
    shared: &'a Shared<T, P, D>,
    armed: bool,
}

impl<T, P: Persist<T>, D> Drop for InFlight<'_, T, P, D> {
    fn drop(&mut self) {
        if self.armed {
            let mut inner = self.shared.inner.lock();
            inner.tracker.complete_failure();
            self.shared.set_saving(false);
            drop(inner);
            warn!("save abandoned before completion");
        }
    }
}

/// Debounced auto-save controller
///
/// Feed it every update of a value with [`observe`](Self::observe); it
/// persists the value once the value has been quiet for the configured delay.
///
/// - The first observed value is the baseline and is never saved
/// - Values equal to the baseline never schedule a save
/// - At most one save is pending and at most one is running
/// - A timer firing during a running save is skipped, not queued
/// - A failed save leaves the baseline alone, so the next differing tick retries
///
/// Dropping the controller tears it down.
///
/// # Example
///
/// ```ignore
/// use autosave::prelude::*;
///
/// let autosave = AutoSave::builder(persist_fn(|draft: Draft| api.put(draft)))
///     .options(AutoSaveOptions::default().with_delay_ms(1000))
///     .on_error(|e| eprintln!("could not save: {e}"))
///     .build()?;
///
/// autosave.observe(draft.clone()); // baseline
/// draft.title = "Launch".into();
/// autosave.observe(draft.clone()); // saved one second later
/// ```
pub struct AutoSave<T, P: Persist<T>, D = StructuralEq> {
    shared: Arc<Shared<T, P, D>>,
}

impl<T, P: Persist<T>> AutoSave<T, P> {
    /// Start building a controller around `persister`.
    pub fn builder(persister: P) -> AutoSaveBuilder<T, P> {
        AutoSaveBuilder::new(persister)
    }
}

impl<T, P> AutoSave<T, P>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    P: Persist<T>,
{
    /// Create a controller with structural change detection and no hooks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(persister: P, options: AutoSaveOptions) -> Result<Self, AutoSaveError> {
        Self::builder(persister).options(options).build()
    }
}

impl<T, P, D> AutoSave<T, P, D>
where
    T: Clone + Send + Sync + 'static,
    P: Persist<T>,
    D: ChangeDetector<T>,
{
    /// Process one update of the watched value.
    ///
    /// Never fails and never blocks on I/O.
    pub fn observe(&self, value: T) {
        self.shared.observe(value);
    }

    /// Cancel the pending timer and save the latest value now.
    ///
    /// Returns `Ok(None)` if nothing differs from the baseline, and
    /// `Ok(Some(AttemptOutcome::Skipped))` if another save is running.
    pub async fn flush(&self) -> Result<Option<AttemptOutcome>, AutoSaveError> {
        self.shared.flush().await
    }

    /// Whether the latest observed value differs from the baseline
    pub fn has_unsaved_changes(&self) -> bool {
        self.shared
            .inner
            .lock()
            .tracker
            .has_unsaved_changes(&self.shared.detector)
    }

    /// Spawn a task observing every value published on `rx`.
    ///
    /// The value current at spawn time is observed first. The task ends
    /// when the sender is dropped or the controller is torn down.
    pub fn watch(&self, rx: watch::Receiver<T>) -> JoinHandle<()> {
        super::driver::spawn(Arc::clone(&self.shared), rx)
    }
}

impl<T, P: Persist<T>, D> AutoSave<T, P, D> {
    /// Whether a save is currently running
    pub fn is_saving(&self) -> bool {
        self.shared.saving.load(Ordering::SeqCst)
    }

    /// Snapshot of save activity
    pub fn status(&self) -> SaveStatus {
        self.shared.status.borrow().clone()
    }

    /// Receive status updates as they happen
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.shared.status.subscribe()
    }

    /// Toggle scheduling. Disabling does not cancel an already pending save.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::SeqCst);
        debug!(enabled, "auto-save toggled");
    }

    /// Whether ticks schedule saves
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
    }

    /// Quiet period between the latest tick and the save
    pub fn delay(&self) -> Duration {
        self.shared.delay
    }

    /// Whether [`teardown`](Self::teardown) has run
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Stop observing and cancel the pending save.
    ///
    /// A save already running is not cancelled: it completes, updates the
    /// baseline and fires its hook. Idempotent.
    pub fn teardown(&self) {
        if !self.shared.is_closed() {
            self.shared.teardown();
        }
    }
}

impl<T, P: Persist<T>, D> Drop for AutoSave<T, P, D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<T, P: Persist<T>, D> std::fmt::Debug for AutoSave<T, P, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSave")
            .field("delay", &self.shared.delay)
            .field("enabled", &self.is_enabled())
            .field("saving", &self.is_saving())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Builder for creating an [`AutoSave`].
pub struct AutoSaveBuilder<T, P: Persist<T>, D = StructuralEq> {
    persister: P,
    options: AutoSaveOptions,
    hooks: SaveHooks<P::Error>,
    detector: D,
    _value: PhantomData<fn(T)>,
}

impl<T, P: Persist<T>> AutoSaveBuilder<T, P> {
    /// Create a builder with default options and structural change detection.
    pub fn new(persister: P) -> Self {
        Self {
            persister,
            options: AutoSaveOptions::default(),
            hooks: SaveHooks::new(),
            detector: StructuralEq,
            _value: PhantomData,
        }
    }
}

impl<T, P: Persist<T>, D> AutoSaveBuilder<T, P, D> {
    /// Replace all options.
    pub fn options(mut self, options: AutoSaveOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the quiet period.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.options = self.options.with_delay(delay);
        self
    }

    /// Start enabled or disabled.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.options.enabled = enabled;
        self
    }

    /// Replace all hooks.
    pub fn hooks(mut self, hooks: SaveHooks<P::Error>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set the success hook.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_success(f);
        self
    }

    /// Set the error hook.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&P::Error) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_error(f);
        self
    }

    /// Use a different change detector.
    pub fn detector<D2>(self, detector: D2) -> AutoSaveBuilder<T, P, D2> {
        AutoSaveBuilder {
            persister: self.persister,
            options: self.options,
            hooks: self.hooks,
            detector,
            _value: PhantomData,
        }
    }

    /// Validate the options and create the controller.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<AutoSave<T, P, D>, AutoSaveError>
    where
        T: Clone + Send + Sync + 'static,
        D: ChangeDetector<T>,
    {
        self.options.validate()?;
        let runtime = Handle::try_current().map_err(|_| AutoSaveError::NoRuntime)?;

        let (status, _) = watch::channel(SaveStatus::default());
        let (closed, _) = watch::channel(false);

        debug!(
            delay_ms = self.options.delay_ms,
            enabled = self.options.enabled,
            "auto-save created"
        );

        Ok(AutoSave {
            shared: Arc::new(Shared {
                persister: self.persister,
                detector: self.detector,
                hooks: self.hooks,
                delay: self.options.delay(),
                enabled: AtomicBool::new(self.options.enabled),
                saving: AtomicBool::new(false),
                runtime,
                inner: Mutex::new(Inner {
                    tracker: SaveTracker::new(),
                    timer: None,
                }),
                status,
                closed,
            }),
        })
    }
}
