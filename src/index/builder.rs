//! Anchor selection and offset collection for the sparse line index
//!
//! Building happens in two steps:
//!
//! 1. [`plan_anchor_lines`] decides *which* line numbers get an anchor. Lines are
//!    spaced uniformly by a skip factor, and whatever capacity the uniform spacing
//!    leaves unused is filled with randomly chosen extra lines, so the index always
//!    holds exactly `min(capacity, total_lines)` anchors.
//! 2. [`collect_anchors`] streams the file once and records the starting byte offset
//!    of every planned line.

use crate::error::{LineServeError, Result};
use crate::index::counter::CHUNK_SIZE;
use crate::index::Anchor;
use memchr::memchr_iter;
use rand::seq::index::sample;
use rand::Rng;
use std::io::{ErrorKind, Read};

/// Uniform spacing between default anchors
///
/// Returns 1 when every line fits in the cache. A zero capacity is treated as 1.
pub fn skip_factor(total_lines: u64, capacity: usize) -> u64 {
    let capacity = capacity.max(1) as u64;
    if total_lines <= capacity {
        1
    } else {
        total_lines.div_ceil(capacity)
    }
}

/// Choose the 0-based line numbers that will be anchored, in ascending order
///
/// # Arguments
/// * `total_lines` - Number of complete lines in the file
/// * `capacity` - Anchor budget (0 is clamped to 1)
/// * `rng` - Random source for the extra anchors
///
/// # Returns
/// * Strictly increasing line numbers, `min(capacity, total_lines)` of them
pub fn plan_anchor_lines<R: Rng + ?Sized>(
    total_lines: u64,
    capacity: usize,
    rng: &mut R,
) -> Vec<u64> {
    let capacity = capacity.max(1);

    if total_lines <= capacity as u64 {
        return (0..total_lines).collect();
    }

    let skip = skip_factor(total_lines, capacity);
    let uniform = total_lines.div_ceil(skip);
    let deficit = capacity - uniform as usize;

    let mut lines: Vec<u64> = (0..uniform).map(|i| i * skip).collect();
    lines.reserve(deficit);

    if deficit > 0 {
        // The complement of the uniform set is laid out as `skip - 1` lines after
        // each uniform anchor, so the k-th complement line can be computed directly.
        let gap = skip - 1;
        let complement = (total_lines - uniform) as usize;
        for k in sample(rng, complement, deficit).into_iter() {
            let k = k as u64;
            lines.push((k / gap) * skip + k % gap + 1);
        }
        lines.sort_unstable();
    }

    lines
}

/// Stream `reader` once, recording the start offset of each planned line
///
/// `planned` must be strictly increasing. Lines are only recorded once their
/// terminating newline has been seen, so a planned line past the end of the
/// data is silently dropped.
pub fn collect_anchors<R: Read>(mut reader: R, planned: &[u64]) -> Result<Vec<Anchor>> {
    let mut anchors = Vec::with_capacity(planned.len());
    let mut buf = vec![0u8; CHUNK_SIZE];

    let mut next = 0usize;
    let mut line = 0u64;
    let mut line_start = 0u64;
    let mut consumed = 0u64;

    while next < planned.len() {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(LineServeError::file_error("Failed to build line index", e)),
        };

        for pos in memchr_iter(b'\n', &buf[..read]) {
            if planned[next] == line {
                anchors.push(Anchor {
                    line_number: line,
                    byte_offset: line_start,
                });
                next += 1;
                if next == planned.len() {
                    break;
                }
            }
            line += 1;
            line_start = consumed + pos as u64 + 1;
        }
        consumed += read as u64;
    }

    Ok(anchors)
}
