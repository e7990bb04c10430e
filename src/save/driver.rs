//! Watch-channel driver
//!
//! Lets a host publish its state on a `tokio::sync::watch` channel instead
//! of calling `observe` by hand on every update.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

use super::controller::Shared;
use crate::core::{ChangeDetector, Persist};

/// Spawn the driver task for `shared`.
pub(super) fn spawn<T, P, D>(shared: Arc<Shared<T, P, D>>, mut rx: watch::Receiver<T>) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    P: Persist<T>,
    D: ChangeDetector<T>,
{
    let mut closed = shared.closed_signal();
    let runtime = shared.runtime().clone();

    runtime.spawn(async move {
        if shared.is_closed() {
            return;
        }
        let current = rx.borrow_and_update().clone();
        shared.observe(current);

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        trace!("watched value sender dropped, driver stopping");
                        break;
                    }
                    let value = rx.borrow_and_update().clone();
                    shared.observe(value);
                }
                res = closed.changed() => {
                    if res.is_err() || *closed.borrow() {
                        trace!("controller torn down, driver stopping");
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::core::persist_fn;
    use crate::save::{AutoSave, AutoSaveOptions};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::sleep;

    #[derive(Debug, thiserror::Error)]
    #[error("unreachable")]
    struct Never;

    type Saved = Arc<Mutex<Vec<u32>>>;

    fn counter_autosave(
        saved: &Saved,
    ) -> AutoSave<u32, impl crate::core::Persist<u32, Error = Never>> {
        let saved = saved.clone();
        AutoSave::new(
            persist_fn(move |value: u32| {
                let saved = saved.clone();
                async move {
                    saved.lock().push(value);
                    Ok::<(), Never>(())
                }
            }),
            AutoSaveOptions::default().with_delay_ms(100),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_observes_channel() {
        let saved = Saved::default();
        let autosave = counter_autosave(&saved);

        let (tx, rx) = watch::channel(1);
        let driver = autosave.watch(rx);
        sleep(Duration::from_millis(1)).await;

        tx.send(2).unwrap();
        sleep(Duration::from_millis(10)).await;
        tx.send(3).unwrap();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(*saved.lock(), vec![3]);

        drop(tx);
        driver.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_stops_on_teardown() {
        let saved = Saved::default();
        let autosave = counter_autosave(&saved);

        let (tx, rx) = watch::channel(1);
        let driver = autosave.watch(rx);
        sleep(Duration::from_millis(1)).await;

        tx.send(2).unwrap();
        autosave.teardown();
        driver.await.unwrap();

        sleep(Duration::from_millis(500)).await;
        assert!(saved.lock().is_empty());
        assert!(tx.send(3).is_err());
    }
}
