//! Success and error callbacks
//!
//! Hooks may run after the controller was torn down: an in-flight save is
//! never cancelled, and its outcome is still reported. Hosts that care must
//! guard against that themselves.

use std::fmt;
use std::sync::Arc;

type SuccessHook = Arc<dyn Fn() + Send + Sync>;
type ErrorHook<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Callbacks invoked after each save attempt completes
pub struct SaveHooks<E> {
    on_success: Option<SuccessHook>,
    on_error: Option<ErrorHook<E>>,
}

impl<E> SaveHooks<E> {
    /// Create hooks that do nothing
    pub fn new() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }

    /// Set the hook called after a successful save
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Set the hook called with the failure after an unsuccessful save
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub(crate) fn succeeded(&self) {
        if let Some(hook) = &self.on_success {
            hook();
        }
    }

    pub(crate) fn failed(&self, error: &E) {
        if let Some(hook) = &self.on_error {
            hook(error);
        }
    }
}

impl<E> Default for SaveHooks<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for SaveHooks<E> {
    fn clone(&self) -> Self {
        Self {
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<E> fmt::Debug for SaveHooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveHooks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
