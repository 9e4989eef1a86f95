//! Release-once completion handshake between a capture session and the
//! process waiting on it.

use tokio::sync::oneshot;

use crate::error::CaptureError;

/// Create a linked signal/waiter pair for one capture session.
pub fn completion_channel() -> (CompletionSignal, CompletionWaiter) {
    let (tx, rx) = oneshot::channel();
    (CompletionSignal { tx }, CompletionWaiter { rx })
}

/// Session-side half. Consumed by [`CompletionSignal::notify`], so it can
/// fire at most once.
#[derive(Debug)]
pub struct CompletionSignal {
    tx: oneshot::Sender<()>,
}

impl CompletionSignal {
    /// Report that editing is complete. Returns `false` when nobody is
    /// waiting anymore.
    pub fn notify(self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Waiter-side half, held by whatever created the session.
#[derive(Debug)]
pub struct CompletionWaiter {
    rx: oneshot::Receiver<()>,
}

impl CompletionWaiter {
    /// Suspend until the session signals. Fails with
    /// [`CaptureError::Abandoned`] if the session went away without signalling.
    pub async fn wait(self) -> Result<(), CaptureError> {
        self.rx.await.map_err(|_| CaptureError::Abandoned)
    }

    /// Blocking variant for callers outside an async runtime.
    pub fn wait_blocking(self) -> Result<(), CaptureError> {
        self.rx.blocking_recv().map_err(|_| CaptureError::Abandoned)
    }

    /// Non-blocking check: `Some(Ok(()))` once signalled, `None` while pending.
    pub fn poll_complete(&mut self) -> Option<Result<(), CaptureError>> {
        match self.rx.try_recv() {
            Ok(()) => Some(Ok(())),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(CaptureError::Abandoned)),
        }
    }
}
