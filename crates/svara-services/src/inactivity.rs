//! Idle detection: run a callback after a period without activity

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Kinds of activity that reset the idle countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    Pointer,
    Key,
    Click,
    Scroll,
    Touch,
    /// A pitched frame from the tuner
    Audio,
}

impl ActivityKind {
    /// Signals originating from direct user interaction
    pub const USER: [ActivityKind; 5] = [
        Self::Pointer,
        Self::Key,
        Self::Click,
        Self::Scroll,
        Self::Touch,
    ];
}

enum Signal {
    Activity(ActivityKind),
    Cancel,
}

/// Invokes a callback once `timeout` passes with no call to [`touch`](Self::touch).
///
/// After firing the timer stays dormant until the next activity, which arms it
/// again. Dropping the timer cancels it.
pub struct InactivityTimer {
    tx: Sender<Signal>,
    timeout: Duration,
    fired: Arc<AtomicU32>,
    handle: Option<JoinHandle<()>>,
}

impl InactivityTimer {
    pub fn start<F>(timeout: Duration, on_idle: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = unbounded();
        let fired = Arc::new(AtomicU32::new(0));
        let fired_count = fired.clone();

        let handle = thread::spawn(move || loop {
            match rx.recv_timeout(timeout) {
                Ok(Signal::Activity(kind)) => trace!(?kind, "Activity"),
                Ok(Signal::Cancel) | Err(RecvTimeoutError::Disconnected) => return,
                Err(RecvTimeoutError::Timeout) => {
                    debug!(timeout_ms = timeout.as_millis() as u64, "Inactivity timeout");
                    fired_count.fetch_add(1, Ordering::SeqCst);
                    on_idle();

                    match rx.recv() {
                        Ok(Signal::Activity(kind)) => trace!(?kind, "Activity, re-armed"),
                        Ok(Signal::Cancel) | Err(_) => return,
                    }
                }
            }
        });

        Self {
            tx,
            timeout,
            fired,
            handle: Some(handle),
        }
    }

    /// Reset the countdown
    pub fn touch(&self, kind: ActivityKind) {
        let _ = self.tx.send(Signal::Activity(kind));
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of times the callback has run
    pub fn fired_count(&self) -> u32 {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn cancel(&mut self) {
        let _ = self.tx.send(Signal::Cancel);
        if let Some(handle) = self.handle.take() {
            // the callback may own the last handle to us
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::time::Instant;

    #[test]
    fn test_fires_after_timeout() {
        let (tx, rx) = bounded(4);
        let start = Instant::now();
        let _timer = InactivityTimer::start(Duration::from_millis(50), move || {
            let _ = tx.send(Instant::now());
        });

        let fired_at = rx.recv_timeout(Duration::from_secs(2)).expect("timer fired");
        assert!(fired_at.duration_since(start) >= Duration::from_millis(50));
    }

    #[test]
    fn test_activity_postpones_and_rearms() {
        let (tx, rx) = bounded(4);
        let timer = InactivityTimer::start(Duration::from_millis(150), move || {
            let _ = tx.send(());
        });

        for kind in ActivityKind::USER {
            thread::sleep(Duration::from_millis(40));
            timer.touch(kind);
        }
        assert_eq!(timer.fired_count(), 0);

        rx.recv_timeout(Duration::from_secs(2)).expect("first idle");
        assert_eq!(timer.fired_count(), 1);

        // dormant until touched again
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        timer.touch(ActivityKind::Key);
        rx.recv_timeout(Duration::from_secs(2)).expect("second idle");
        assert_eq!(timer.fired_count(), 2);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let (tx, rx) = bounded(4);
        let mut timer = InactivityTimer::start(Duration::from_millis(50), move || {
            let _ = tx.send(());
        });
        timer.cancel();
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert_eq!(timer.fired_count(), 0);
    }
}
