//! Built-in change detectors.

use super::traits::ChangeDetector;

/// Deep structural equality via [`PartialEq`].
///
/// Two values are "the same" when they compare equal field by field,
/// regardless of where they live in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralEq;

impl<T: PartialEq> ChangeDetector<T> for StructuralEq {
    fn differs(&self, baseline: &T, current: &T) -> bool {
        baseline != current
    }
}

/// Equality of serialized renderings.
///
/// Both values are rendered to a [`serde_json::Value`] and the renderings are
/// compared. Useful for types that implement `Serialize` but not `PartialEq`.
/// A value that fails to serialize is always treated as changed, so a save
/// is attempted and the persister gets to report the problem.
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializedEq;

#[cfg(feature = "serde")]
impl<T: serde::Serialize> ChangeDetector<T> for SerializedEq {
    fn differs(&self, baseline: &T, current: &T) -> bool {
        match (serde_json::to_value(baseline), serde_json::to_value(current)) {
            (Ok(a), Ok(b)) => a != b,
            _ => true,
        }
    }
}
