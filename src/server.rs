//! TCP line server.
//!
//! This module owns the listening socket and the accept loop. Every accepted
//! connection is served by its own task running [`handle_connection`]; the tasks
//! share the lookup engine and a [`ShutdownHandle`], and nothing else.

pub mod connection;
pub mod protocol;
pub mod state;

pub use connection::handle_connection;
pub use protocol::Command;
pub use state::{ServerState, ShutdownHandle};

use crate::error::{LineServeError, Result};
use crate::index::LineLookup;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Line server bound to a listening socket
pub struct LineServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    lookup: Arc<dyn LineLookup>,
    shutdown: ShutdownHandle,
}

impl LineServer {
    /// Bind the listening socket
    ///
    /// # Arguments
    /// * `addr` - `host:port`; port 0 asks the OS for a free port
    /// * `lookup` - Engine answering `GET` requests
    pub async fn bind(addr: &str, lookup: Arc<dyn LineLookup>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| LineServeError::server(format!("Failed to bind {addr}"), e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| LineServeError::server("Failed to read listener address", e))?;

        Ok(Self {
            listener,
            local_addr,
            lookup,
            shutdown: ShutdownHandle::new(),
        })
    }

    /// Address actually bound, with any OS-assigned port resolved
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle for triggering shutdown from outside the server (e.g. signals)
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Run the accept loop until shutdown is triggered
    ///
    /// The listener is closed when this returns. Connections accepted earlier keep
    /// running until their clients are done.
    ///
    /// # Errors
    /// * `ServerError` if accepting fails while still listening
    pub async fn run(self) -> Result<()> {
        let LineServer {
            listener,
            local_addr,
            lookup,
            shutdown,
        } = self;

        log::info!("Server listening for connections on {local_addr}");

        let result = loop {
            tokio::select! {
                biased;

                _ = shutdown.triggered() => break Ok(()),

                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        log::debug!("Accepted connection from {peer}");
                        let lookup = Arc::clone(&lookup);
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            match handle_connection(stream, lookup, shutdown).await {
                                Ok(()) => log::debug!("Connection from {peer} closed"),
                                Err(e) => log::warn!("Connection from {peer} failed: {e}"),
                            }
                        });
                    }
                    Err(e) => {
                        if shutdown.state() != ServerState::Listening {
                            break Ok(());
                        }
                        break Err(LineServeError::server("Failed to accept connection", e));
                    }
                },
            }
        };

        drop(listener);
        shutdown.mark_stopped();
        log::info!("Server on {local_addr} stopped accepting connections");
        result
    }
}

impl std::fmt::Debug for LineServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineServer")
            .field("local_addr", &self.local_addr)
            .field("state", &self.shutdown.state())
            .finish()
    }
}
