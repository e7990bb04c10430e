//! Core traits for the auto-save controller.
//!
//! These traits define the two seams the host plugs into: how a snapshot is
//! persisted, and how two snapshots are compared.

use std::future::Future;

/// Asynchronous persistence of a watched value.
///
/// The controller calls [`persist`](Persist::persist) at most once at a time
/// per instance, with the latest observed snapshot.
///
/// # Requirements
///
/// - Failures MUST be reported through `Err`, never by panicking
/// - The returned future MUST be `Send`; it runs on a spawned task
///
/// # Example
///
/// ```ignore
/// struct Drafts { client: ApiClient }
///
/// impl Persist<Draft> for Drafts {
///     type Error = ApiError;
///
///     async fn persist(&self, draft: &Draft) -> Result<(), ApiError> {
///         self.client.put_draft(draft).await
///     }
/// }
/// ```
pub trait Persist<T>: Send + Sync + 'static {
    /// Failure reported to the `on_error` hook.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist one snapshot.
    fn persist(&self, value: &T) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Decides whether a newly observed value differs from the baseline.
///
/// Implementations MUST be pure: the same pair of inputs always yields the
/// same answer.
pub trait ChangeDetector<T>: Send + Sync + 'static {
    /// Returns `true` if `current` should be treated as a change from `baseline`.
    fn differs(&self, baseline: &T, current: &T) -> bool;
}

/// Adapter turning an async closure into a [`Persist`] implementation.
///
/// Created with [`persist_fn`].
#[derive(Clone)]
pub struct FnPersister<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnPersister<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPersister").finish_non_exhaustive()
    }
}

/// Wrap a closure `Fn(T) -> impl Future<Output = Result<(), E>>` as a persister.
///
/// The closure receives an owned clone of the snapshot.
pub fn persist_fn<F>(f: F) -> FnPersister<F> {
    FnPersister { f }
}

impl<T, F, Fut, E> Persist<T> for FnPersister<F>
where
    T: Clone,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn persist(&self, value: &T) -> impl Future<Output = Result<(), E>> + Send {
        (self.f)(value.clone())
    }
}

impl<T, F> ChangeDetector<T> for F
where
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    fn differs(&self, baseline: &T, current: &T) -> bool {
        self(baseline, current)
    }
}
