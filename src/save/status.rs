//! Observable controller status

/// How one save attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttemptOutcome {
    /// The persister returned `Ok`.
    Succeeded,
    /// The persister returned `Err`.
    Failed,
    /// Another save was running, so this attempt never started.
    Skipped,
}

/// Snapshot of a controller's save activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveStatus {
    /// Whether a save is currently running
    pub saving: bool,
    /// Completed successful saves
    pub succeeded: u64,
    /// Completed failed saves
    pub failed: u64,
    /// Attempts dropped because a save was already running
    pub skipped: u64,
    /// Outcome of the most recent attempt
    pub last_outcome: Option<AttemptOutcome>,
}

impl SaveStatus {
    /// Record an attempt outcome
    pub fn record(&mut self, outcome: AttemptOutcome) {
        match outcome {
            AttemptOutcome::Succeeded => self.succeeded += 1,
            AttemptOutcome::Failed => self.failed += 1,
            AttemptOutcome::Skipped => self.skipped += 1,
        }
        self.last_outcome = Some(outcome);
    }

    /// Total attempts that actually called the persister
    pub fn attempts(&self) -> u64 {
        self.succeeded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut status = SaveStatus::default();
        assert_eq!(status.last_outcome, None);

        status.record(AttemptOutcome::Succeeded);
        status.record(AttemptOutcome::Failed);
        status.record(AttemptOutcome::Skipped);
        status.record(AttemptOutcome::Succeeded);

        assert_eq!(status.succeeded, 2);
        assert_eq!(status.failed, 1);
        assert_eq!(status.skipped, 1);
        assert_eq!(status.attempts(), 3);
        assert_eq!(status.last_outcome, Some(AttemptOutcome::Succeeded));
    }
}
