//! Streaming newline counter
//!
//! Counts newline-terminated records without holding more than one chunk of the
//! file in memory. Uses memchr for SIMD-optimized newline detection.

use crate::error::{LineServeError, Result};
use memchr::memchr_iter;
use std::io::{ErrorKind, Read};

/// Size of the buffer used when streaming through a file
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Count the newline-terminated lines produced by `reader`
///
/// # Arguments
/// * `reader` - Source positioned at the first byte to count from
///
/// # Returns
/// * Number of `\n` bytes seen, i.e. the number of complete lines.
///   A trailing fragment without a newline is not a line.
///
/// # Performance
/// * O(n) in the size of the input, O(1) memory
pub fn count_lines<R: Read>(mut reader: R) -> Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut count = 0u64;

    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => return Ok(count),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(LineServeError::file_error("Failed to count lines", e)),
        };
        count += memchr_iter(b'\n', &buf[..read]).count() as u64;
    }
}
