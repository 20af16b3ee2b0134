//! Line lookup abstraction.
//!
//! The connection layer only needs to turn a line number into line bytes. This
//! trait is the seam between the server and whatever engine answers that question,
//! so an alternative index can be plugged in without touching the server.

use crate::error::Result;
use async_trait::async_trait;

/// Core trait for serving lines by number
///
/// All implementations must be thread-safe; a single instance is shared by every
/// connection task.
#[async_trait]
pub trait LineLookup: Send + Sync {
    /// Fetch a line by its 1-based number
    ///
    /// # Arguments
    /// * `line_number` - 1-based line number as sent by the client
    ///
    /// # Returns
    /// * Exact bytes of the line, including its terminating newline
    /// * `LineOutOfRange` if the number is below 1 or past the last line
    /// * `FileError` if the underlying read fails
    async fn lookup(&self, line_number: i64) -> Result<Vec<u8>>;
}
