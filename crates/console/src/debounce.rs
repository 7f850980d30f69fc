//! Single-slot debouncer for rapidly changing inputs.
//!
//! Each [`Debouncer::push`] cancels the pending propagation and schedules a
//! new one, so at most one value is emitted per quiet period and only the
//! last value of a burst reaches the receiver. Dropping the debouncer cancels
//! whatever is pending.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Quiet period used by search inputs.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1500);

struct Pending {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Debouncer<T> {
    quiet_period: Duration,
    sender: mpsc::UnboundedSender<T>,
    /// Parent of every pending token; cancelled on drop.
    root: CancellationToken,
    pending: Option<Pending>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its settled values arrive on.
    pub fn new(quiet_period: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            quiet_period,
            sender,
            root: CancellationToken::new(),
            pending: None,
        };
        (debouncer, receiver)
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Schedule `value` for propagation after the quiet period, replacing
    /// any value still pending. Must be called within a Tokio runtime.
    pub fn push(&mut self, value: T) {
        self.flush();

        let cancel = self.root.child_token();
        let token = cancel.clone();
        let sender = self.sender.clone();
        let quiet_period = self.quiet_period;

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(quiet_period) => {
                    // The receiver may be gone when the view was torn down.
                    let _ = sender.send(value);
                }
            }
        });

        self.pending = Some(Pending { cancel, handle });
    }

    /// Drop the pending value without emitting it.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.cancel.is_cancelled() && !p.handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
