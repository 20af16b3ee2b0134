//! Server lifecycle state and the shutdown trigger.
//!
//! The server moves through `Listening -> ShuttingDown -> Stopped`. Both a client's
//! `SHUTDOWN` command and a process signal go through [`ShutdownHandle::trigger`],
//! which performs the `Listening -> ShuttingDown` transition under a mutex. Only
//! the first trigger has an effect; later ones are no-ops.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of a [`LineServer`](crate::server::LineServer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Accept loop running
    Listening,
    /// Shutdown requested, listener closing
    ShuttingDown,
    /// Accept loop has returned
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Listening => "listening",
            ServerState::ShuttingDown => "shutting down",
            ServerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

struct Shared {
    state: Mutex<ServerState>,
    closed: watch::Sender<bool>,
}

/// Cloneable handle to the server's state machine
///
/// Handed to every connection task and to the signal listener.
#[derive(Clone)]
pub struct ShutdownHandle {
    shared: Arc<Shared>,
}

impl ShutdownHandle {
    pub(crate) fn new() -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ServerState::Listening),
                closed,
            }),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        *self.shared.state.lock()
    }

    /// Request shutdown of the accept loop
    ///
    /// # Returns
    /// * `true` if this call moved the server out of `Listening`
    /// * `false` if shutdown had already been triggered
    pub fn trigger(&self) -> bool {
        let mut state = self.shared.state.lock();
        if *state != ServerState::Listening {
            return false;
        }
        *state = ServerState::ShuttingDown;
        self.shared.closed.send_replace(true);
        true
    }

    /// Wait until shutdown has been triggered
    pub async fn triggered(&self) {
        let mut rx = self.shared.closed.subscribe();
        // The sender lives in `shared`, which we hold, so the channel cannot close.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    pub(crate) fn mark_stopped(&self) {
        *self.shared.state.lock() = ServerState::Stopped;
    }
}

impl fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("state", &self.state())
            .finish()
    }
}
