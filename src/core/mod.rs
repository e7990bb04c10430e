//! Core types shared by every part of the crate.
//!
//! - [`constants`]: default and maximum quiet periods
//! - errors: [`ConfigError`], [`AutoSaveError`]
//! - seams: [`Persist`] and [`ChangeDetector`]
//! - built-in detectors: [`StructuralEq`] and, with `serde`, `SerializedEq`

pub mod constants;
mod detect;
mod error;
mod traits;

pub use detect::*;
pub use error::*;
pub use traits::*;
