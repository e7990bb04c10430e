//! Auto-save layer
//!
//! Implements:
//! - Baseline tracking and change detection per tick
//! - A single debounced pending attempt per controller
//! - Skip-not-queue guarding of concurrent saves
//! - Outcome reporting through hooks and a status channel

mod hooks;
mod options;
mod status;
mod tracker;

#[cfg(feature = "runtime")]
mod controller;
#[cfg(feature = "runtime")]
mod driver;

pub use hooks::*;
pub use options::*;
pub use status::*;
pub use tracker::*;

#[cfg(feature = "runtime")]
#[cfg_attr(docsrs, doc(cfg(feature = "runtime")))]
pub use controller::{AutoSave, AutoSaveBuilder};
