//! # lineserve - Line Server for Large Immutable Files
//!
//! Serves arbitrary lines of a large newline-delimited text file over TCP without
//! loading the file into memory and without rescanning it from the start for
//! every request.
//!
//! ## Features
//!
//! - **Sparse Offset Index**: A fixed budget of (line, byte offset) anchors spread
//!   uniformly over the file, topped up with random extras so the budget is fully used
//! - **Concurrent Serving**: One tokio task per connection, each lookup with its own
//!   file handle
//! - **Idempotent Shutdown**: `SHUTDOWN` from any client or a termination signal
//!   stops the accept loop exactly once
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`index`] - Line counting, anchor building and the offset cache
//! - [`server`] - Listener, per-connection request loop and shutdown state
//! - [`config`] - Startup configuration

pub mod config;
pub mod error;
pub mod index;
pub mod server;

// Re-export commonly used types for convenience
pub use error::{LineServeError, Result};

pub use config::{ConfigOverrides, ServerConfig};
pub use index::{LineLookup, OffsetCache};
pub use server::{LineServer, ServerState, ShutdownHandle};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
