//! Save bookkeeping
//!
//! Tracks the baseline snapshot, the single pending attempt and the in-flight
//! guard for one controller. Contains no timers: the runtime-driven
//! controller owns the clock and asks the tracker what to do.

use crate::core::ChangeDetector;
use crate::core::constants::INITIAL_GENERATION;

/// What an observation tick asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveAction {
    /// First tick: the value became the baseline. Nothing scheduled.
    Baseline,
    /// Auto-save is disabled. Nothing scheduled, pending attempt untouched.
    Disabled,
    /// Value equals the baseline. Any pending attempt was dropped.
    Unchanged {
        /// Generation of the dropped attempt, if there was one.
        cancelled: Option<u64>,
    },
    /// Value differs: schedule a new attempt.
    Schedule {
        /// Generation of the new attempt.
        generation: u64,
        /// Generation of the attempt it supersedes, if any.
        replaced: Option<u64>,
    },
    /// Tracker is closed; the tick was ignored.
    Closed,
}

/// What a fired (or flushed) attempt should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireDecision<T> {
    /// Persist this snapshot. The in-flight guard is now held.
    Run(T),
    /// Another save is running; this attempt is dropped, not queued.
    Skipped,
    /// The attempt was superseded or cancelled before it fired.
    Stale,
    /// Nothing differs from the baseline.
    Clean,
    /// Tracker is closed.
    Closed,
}

/// Per-controller save state
///
/// - `baseline`: last successfully persisted value (initially the first observed value)
/// - `latest`: most recent observed value, handed to the persister at fire time
/// - `pending`: generation of the one scheduled attempt, if any
/// - `in_flight`: whether a save is currently running
#[derive(Debug, Clone)]
pub struct SaveTracker<T> {
    baseline: Option<T>,
    latest: Option<T>,
    pending: Option<u64>,
    generation: u64,
    in_flight: bool,
    closed: bool,
}

impl<T> Default for SaveTracker<T> {
    fn default() -> Self {
        Self {
            baseline: None,
            latest: None,
            pending: None,
            generation: INITIAL_GENERATION,
            in_flight: false,
            closed: false,
        }
    }
}

impl<T> SaveTracker<T> {
    /// Create an empty tracker (no baseline yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no tick has been processed yet
    pub fn is_first_observation(&self) -> bool {
        self.baseline.is_none()
    }

    /// Last persisted (or initial) snapshot
    pub fn baseline(&self) -> Option<&T> {
        self.baseline.as_ref()
    }

    /// Most recently observed snapshot
    pub fn latest(&self) -> Option<&T> {
        self.latest.as_ref()
    }

    /// Generation of the pending attempt, if one is scheduled
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending
    }

    /// Whether a save is running
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether the tracker has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the latest observed value differs from the baseline
    pub fn has_unsaved_changes<D>(&self, detector: &D) -> bool
    where
        D: ChangeDetector<T> + ?Sized,
    {
        match (&self.baseline, &self.latest) {
            (Some(baseline), Some(latest)) => detector.differs(baseline, latest),
            _ => false,
        }
    }

    /// Record a successful save of `snapshot` and release the in-flight guard.
    pub fn complete_success(&mut self, snapshot: T) {
        self.baseline = Some(snapshot);
        self.in_flight = false;
    }

    /// Record a failed save and release the in-flight guard.
    ///
    /// The baseline is left untouched so the next differing tick retries.
    pub fn complete_failure(&mut self) {
        self.in_flight = false;
    }

    /// Drop the pending attempt, returning its generation.
    pub fn cancel_pending(&mut self) -> Option<u64> {
        self.pending.take()
    }

    /// Close the tracker. Returns the generation of a dropped pending attempt.
    ///
    /// An in-flight save may still complete afterwards.
    pub fn close(&mut self) -> Option<u64> {
        self.closed = true;
        self.pending.take()
    }
}

impl<T: Clone> SaveTracker<T> {
    /// Process one observation tick.
    pub fn observe<D>(&mut self, value: T, enabled: bool, detector: &D) -> ObserveAction
    where
        D: ChangeDetector<T> + ?Sized,
    {
        if self.closed {
            return ObserveAction::Closed;
        }

        let Some(baseline) = self.baseline.as_ref() else {
            self.baseline = Some(value.clone());
            self.latest = Some(value);
            return ObserveAction::Baseline;
        };

        let changed = enabled && detector.differs(baseline, &value);
        self.latest = Some(value);

        if !enabled {
            return ObserveAction::Disabled;
        }

        if !changed {
            return ObserveAction::Unchanged {
                cancelled: self.pending.take(),
            };
        }

        self.generation += 1;
        let replaced = self.pending.replace(self.generation);
        ObserveAction::Schedule {
            generation: self.generation,
            replaced,
        }
    }

    /// Decide what the timer for `generation` should do now that it elapsed.
    pub fn fire(&mut self, generation: u64) -> FireDecision<T> {
        if self.closed {
            return FireDecision::Closed;
        }
        if self.pending != Some(generation) {
            return FireDecision::Stale;
        }
        self.pending = None;

        if self.in_flight {
            return FireDecision::Skipped;
        }

        match self.latest.clone() {
            Some(snapshot) => {
                self.in_flight = true;
                FireDecision::Run(snapshot)
            }
            None => FireDecision::Clean,
        }
    }

    /// Decide whether to save right now, dropping the pending attempt.
    ///
    /// While a save is running the pending attempt is kept.
    pub fn flush<D>(&mut self, detector: &D) -> FireDecision<T>
    where
        D: ChangeDetector<T> + ?Sized,
    {
        if self.closed {
            return FireDecision::Closed;
        }
        if self.in_flight {
            return FireDecision::Skipped;
        }
        self.pending = None;

        if !self.has_unsaved_changes(detector) {
            return FireDecision::Clean;
        }

        match self.latest.clone() {
            Some(snapshot) => {
                self.in_flight = true;
                FireDecision::Run(snapshot)
            }
            None => FireDecision::Clean,
        }
    }
}
