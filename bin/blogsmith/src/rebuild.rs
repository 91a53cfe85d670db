//! Debounced rebuild loop for live mode.
//!
//! File system events arrive on a channel. A burst of events collapses into
//! one rebuild once the source has been quiet for [`QUIET_PERIOD`]. Events
//! that arrive while a rebuild runs schedule exactly one follow-up rebuild.

use std::{future::Future, time::Duration};

use tokio::{sync::mpsc, time::timeout};

/// How long the source tree must stay quiet before a rebuild starts.
pub const QUIET_PERIOD: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    /// Idle, waiting for the first change.
    Watching,
    /// A change was seen; waiting for the quiet period to elapse.
    Debouncing,
    /// A rebuild is due.
    Building,
}

/// Drive rebuilds from change notifications until the channel closes.
///
/// `rebuild` is awaited to completion before the next event is considered,
/// so at most one rebuild is in flight. Events queued during a rebuild are
/// drained and turned into a single trailing rebuild.
///
/// Returns the number of rebuilds performed.
pub async fn run_debounced<T, F, Fut>(
    mut rx: mpsc::Receiver<T>,
    quiet: Duration,
    mut rebuild: F,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut state = LoopState::Watching;
    let mut builds = 0;
    let mut closed = false;

    loop {
        state = match state {
            LoopState::Watching => match rx.recv().await {
                Some(_) => LoopState::Debouncing,
                None => break,
            },
            LoopState::Debouncing => match timeout(quiet, rx.recv()).await {
                Ok(Some(_)) => LoopState::Debouncing,
                Ok(None) => {
                    closed = true;
                    LoopState::Building
                }
                Err(_) => LoopState::Building,
            },
            LoopState::Building => {
                tracing::debug!(build = builds + 1, "source changed, rebuilding");
                rebuild().await;
                builds += 1;

                if closed {
                    break;
                }

                let mut pending = false;
                loop {
                    match rx.try_recv() {
                        Ok(_) => pending = true,
                        Err(mpsc::error::TryRecvError::Empty) => break,
                        Err(mpsc::error::TryRecvError::Disconnected) => {
                            closed = true;
                            break;
                        }
                    }
                }

                match (pending, closed) {
                    (true, _) => LoopState::Debouncing,
                    (false, true) => break,
                    (false, false) => LoopState::Watching,
                }
            }
        };
    }

    tracing::debug!(builds, "watch channel closed");
    builds
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use tokio::time::sleep;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> std::future::Ready<()>) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let rebuild = move || {
            inner.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        };
        (count, rebuild)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_one_build() {
        let (tx, rx) = mpsc::channel(64);
        let (count, rebuild) = counter();
        let handle = tokio::spawn(run_debounced(rx, QUIET_PERIOD, rebuild));

        for _ in 0..20 {
            tx.send(()).await.unwrap();
        }
        sleep(Duration::from_millis(500)).await;
        drop(tx);

        assert_eq!(handle.await.unwrap(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_events_build_twice() {
        let (tx, rx) = mpsc::channel(64);
        let (_, rebuild) = counter();
        let handle = tokio::spawn(run_debounced(rx, QUIET_PERIOD, rebuild));

        tx.send(()).await.unwrap();
        sleep(Duration::from_millis(300)).await;
        tx.send(()).await.unwrap();
        sleep(Duration::from_millis(300)).await;
        drop(tx);

        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_inside_quiet_period_extend_it() {
        let (tx, rx) = mpsc::channel(64);
        let (_, rebuild) = counter();
        let handle = tokio::spawn(run_debounced(rx, QUIET_PERIOD, rebuild));

        for _ in 0..5 {
            tx.send(()).await.unwrap();
            sleep(Duration::from_millis(50)).await;
        }
        sleep(Duration::from_millis(300)).await;
        drop(tx);

        assert_eq!(handle.await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_during_build_trigger_one_follow_up() {
        let (tx, rx) = mpsc::channel(64);
        let sender = tx.clone();
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);

        let rebuild = move || {
            let sender = sender.clone();
            let first = inner.fetch_add(1, Ordering::SeqCst) == 0;
            async move {
                if first {
                    for _ in 0..3 {
                        let _ = sender.try_send(());
                    }
                    sleep(Duration::from_millis(200)).await;
                }
            }
        };
        let handle = tokio::spawn(run_debounced(rx, QUIET_PERIOD, rebuild));

        tx.send(()).await.unwrap();
        sleep(Duration::from_secs(2)).await;
        drop(tx);

        // The rebuild closure holds a sender clone, so stop the loop by aborting.
        handle.abort();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_while_debouncing_still_builds() {
        let (tx, rx) = mpsc::channel(64);
        let (count, rebuild) = counter();
        let handle = tokio::spawn(run_debounced(rx, QUIET_PERIOD, rebuild));

        tx.send(()).await.unwrap();
        drop(tx);

        assert_eq!(handle.await.unwrap(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
