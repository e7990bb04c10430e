//! # autosave
//!
//! Debounced auto-persist for values that change often: form drafts, link
//! lists, profile settings. Feed the controller every update and it persists
//! the value once updates have been quiet for a while.
//!
//! - **Debounce**: one save per quiet period, measured from the latest tick
//! - **Change detection**: values equal to the last persisted one are never saved
//! - **No overlap**: at most one save runs at a time; extra attempts are skipped
//! - **Recovery**: a failed save keeps the old baseline, so the next tick retries
//!
//! ## Feature Flags
//!
//! - `runtime` (default): tokio-driven [`AutoSave`] controller
//! - `serde` (default): serializable options and the `SerializedEq` detector
//!
//! ## Modules
//!
//! - [`core`]: Traits, constants, detectors and error types (always included)
//! - [`save`]: Tracker, options, hooks, status and the controller
//!
//! ## Example Usage
//!
//! ```rust
//! use autosave::prelude::*;
//! use std::time::Duration;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("offline")]
//! struct Offline;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), AutoSaveError> {
//! let autosave = AutoSave::builder(persist_fn(|bio: String| async move {
//!     println!("saving {bio}");
//!     Ok::<(), Offline>(())
//! }))
//! .delay(Duration::from_millis(10))
//! .build()?;
//!
//! autosave.observe("hello".to_string()); // baseline, never saved
//! autosave.observe("hello, world".to_string()); // saved after 10ms of quiet
//! autosave.flush().await?; // or right now
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Auto-save layer
pub mod save;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::save::*;
}

// Re-export commonly used items at crate root
pub use crate::core::{AutoSaveError, ChangeDetector, ConfigError, Persist, persist_fn};
pub use save::{AttemptOutcome, AutoSaveOptions, SaveHooks, SaveStatus};

#[cfg(feature = "runtime")]
pub use save::AutoSave;
