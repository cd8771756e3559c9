// src/debounce.rs
// =============================================================================
// Debounced input: turns a burst of raw edits into one "settled" value.
//
// How it works:
// - Raw values are pushed into an mpsc channel
// - A background task keeps the latest value and restarts a timer on every
//   new one
// - When the timer fires without another edit, the value is sent on the
//   settled channel
//
// So typing "a", "ab", "abc" quickly and then pausing produces exactly one
// settle, "abc". An intermediate value is never emitted.
// =============================================================================

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Settle delay used by the repository URL field.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

// Sending half of a debouncer. Dropping it flushes any pending value (after
// the delay) and then ends the settled stream.
#[derive(Debug)]
pub struct Debouncer<T> {
    raw: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    // Spawns the debounce task. Returns the debouncer and the receiver of
    // settled values.
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();

        tokio::spawn(run(delay, raw_rx, settled_tx));

        (Self { raw: raw_tx }, settled_rx)
    }

    /// Records a new raw value, cancelling any pending settle.
    pub fn push(&self, value: T) {
        // Only fails once the task is gone, at which point nobody listens
        let _ = self.raw.send(value);
    }
}

async fn run<T>(
    delay: Duration,
    mut raw: mpsc::UnboundedReceiver<T>,
    settled: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<(T, Instant)> = None;

    loop {
        match pending.take() {
            None => match raw.recv().await {
                Some(value) => pending = Some((value, Instant::now() + delay)),
                None => return,
            },
            Some((value, deadline)) => {
                tokio::select! {
                    next = raw.recv() => match next {
                        Some(newer) => pending = Some((newer, Instant::now() + delay)),
                        // Input closed: the last value still gets its quiet window
                        None => {
                            sleep_until(deadline).await;
                            let _ = settled.send(value);
                            return;
                        }
                    },
                    _ = sleep_until(deadline) => {
                        if settled.send(value).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, sleep};

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_settle_once_to_last_value() {
        let (debouncer, mut settled) = Debouncer::spawn(DEFAULT_DELAY);

        debouncer.push("a".to_string());
        sleep(Duration::from_millis(300)).await;
        debouncer.push("ab".to_string());
        sleep(Duration::from_millis(300)).await;
        debouncer.push("abc".to_string());

        sleep(Duration::from_millis(999)).await;
        assert!(settled.try_recv().is_err());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(settled.recv().await.as_deref(), Some("abc"));

        // Nothing else is pending
        advance(Duration::from_secs(5)).await;
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_settle_separately() {
        let (debouncer, mut settled) = Debouncer::spawn(Duration::from_millis(100));

        debouncer.push(1);
        sleep(Duration::from_millis(150)).await;
        debouncer.push(2);
        debouncer.push(3);
        sleep(Duration::from_millis(150)).await;

        assert_eq!(settled.recv().await, Some(1));
        assert_eq!(settled.recv().await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_input_flushes_pending_value_then_closes() {
        let (debouncer, mut settled) = Debouncer::spawn(Duration::from_millis(100));

        debouncer.push("https://github.com/octocat/Hello-World");
        drop(debouncer);

        assert_eq!(
            settled.recv().await,
            Some("https://github.com/octocat/Hello-World")
        );
        assert_eq!(settled.recv().await, None);
    }
}
