//! Timing constants for the auto-save controller.
//!
//! Option presets and validation are expressed in terms of these values.

use std::time::Duration;

// =============================================================================
// QUIET PERIOD
// =============================================================================

/// Default quiet period before a scheduled save fires (milliseconds).
pub const DEFAULT_DELAY_MS: u64 = 2000;

/// Default quiet period as a [`Duration`].
pub const DEFAULT_DELAY: Duration = Duration::from_millis(DEFAULT_DELAY_MS);

/// Quiet period used by the `eager` preset (milliseconds).
pub const EAGER_DELAY_MS: u64 = 500;

/// Quiet period used by the `relaxed` preset (milliseconds).
pub const RELAXED_DELAY_MS: u64 = 10_000;

/// Longest accepted quiet period (one hour).
pub const MAX_DELAY_MS: u64 = 60 * 60 * 1000;

// =============================================================================
// SCHEDULING
// =============================================================================

/// Generation number carried by a tracker that has never scheduled a save.
pub const INITIAL_GENERATION: u64 = 0;
