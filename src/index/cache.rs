//! Immutable sparse offset cache
//!
//! This module provides the OffsetCache that maps a subset of line numbers to their
//! byte offsets in the target file. A lookup binary-searches for the closest anchor
//! at or before the requested line, seeks there, and reads forward the remaining
//! distance. The cache is built once and never changes afterwards; requests carry
//! no locality, so recording recently served lines would only break the uniform
//! spacing of the anchors.

use crate::error::{LineServeError, Result};
use crate::index::builder::{collect_anchors, plan_anchor_lines, skip_factor};
use crate::index::counter::count_lines;
use crate::index::lookup::LineLookup;
use crate::index::validation::validate_file_path;
use crate::index::Anchor;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{ErrorKind, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

/// Starting point and distance of a single lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPlan {
    /// 0-based line the forward scan starts at
    pub start_line: u64,
    /// Byte offset of `start_line`
    pub start_offset: u64,
    /// 0-based line being looked up
    pub target: u64,
}

impl LookupPlan {
    /// Number of lines read and discarded before the target line
    pub fn lines_to_skip(&self) -> u64 {
        self.target - self.start_line
    }
}

/// Find the anchor with the greatest line number `<= target`
///
/// # Returns
/// * `None` when `anchors` is empty or `target` precedes the first anchor
pub fn floor_anchor(anchors: &[Anchor], target: u64) -> Option<&Anchor> {
    let idx = anchors.partition_point(|a| a.line_number <= target);
    idx.checked_sub(1).map(|i| &anchors[i])
}

/// Read-only line offset index over one file
///
/// The file path is stored instead of an open handle: every lookup opens its own
/// handle, so concurrent lookups never share a file cursor.
#[derive(Debug)]
pub struct OffsetCache {
    path: PathBuf,
    anchors: Vec<Anchor>,
    total_lines: u64,
}

impl OffsetCache {
    /// Build a cache for `path` on the blocking thread pool
    ///
    /// # Arguments
    /// * `path` - File to index
    /// * `capacity` - Anchor budget (0 is treated as 1)
    /// * `seed` - Fixed seed for the extra anchor selection, entropy when `None`
    ///
    /// # Errors
    /// * `ConfigError` if the file is missing, not a file or unreadable
    /// * `FileError` if counting or indexing fails part way
    pub async fn open(path: impl AsRef<Path>, capacity: usize, seed: Option<u64>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        tokio::task::spawn_blocking(move || match seed {
            Some(seed) => Self::build_with_rng(&path, capacity, &mut StdRng::seed_from_u64(seed)),
            None => Self::build_with_rng(&path, capacity, &mut rand::thread_rng()),
        })
        .await
        .map_err(|e| {
            LineServeError::file_error(
                "Index build task failed",
                std::io::Error::new(ErrorKind::Other, e),
            )
        })?
    }

    /// Build a cache synchronously with the given random source
    pub fn build_with_rng<R: Rng + ?Sized>(path: &Path, capacity: usize, rng: &mut R) -> Result<Self> {
        validate_file_path(path)?;

        let mut file = File::open(path).map_err(|e| {
            LineServeError::config(format!("Cannot open file {}: {}", path.display(), e))
        })?;

        log::info!("Counting lines in {}", path.display());
        let total_lines = count_lines(&file)?;

        file.seek(SeekFrom::Start(0))
            .map_err(|e| LineServeError::file_error("Failed to rewind file", e))?;

        let planned = plan_anchor_lines(total_lines, capacity, rng);
        let anchors = collect_anchors(&file, &planned)?;

        if anchors.len() != planned.len() {
            return Err(LineServeError::file_error(
                format!("File changed while indexing: {}", path.display()),
                std::io::Error::new(ErrorKind::UnexpectedEof, "fewer lines than counted"),
            ));
        }

        log::info!(
            "Indexed {} lines with {} anchors (skip factor {})",
            total_lines,
            anchors.len(),
            skip_factor(total_lines, capacity)
        );

        Ok(Self {
            path: path.to_path_buf(),
            anchors,
            total_lines,
        })
    }

    /// Path of the indexed file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All anchors in ascending line order
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Number of newline-terminated lines in the file
    pub fn total_lines(&self) -> u64 {
        self.total_lines
    }

    /// Resolve a 1-based line number to the scan a lookup would perform
    pub fn plan(&self, line_number: i64) -> Result<LookupPlan> {
        if line_number < 1 || line_number as u64 > self.total_lines {
            return Err(LineServeError::LineOutOfRange {
                line_number,
                total_lines: self.total_lines,
            });
        }

        let target = line_number as u64 - 1;
        let (start_line, start_offset) = match floor_anchor(&self.anchors, target) {
            Some(anchor) => (anchor.line_number, anchor.byte_offset),
            None => (0, 0),
        };

        Ok(LookupPlan {
            start_line,
            start_offset,
            target,
        })
    }

    async fn read_planned(&self, plan: LookupPlan) -> Result<Vec<u8>> {
        let mut file = tokio::fs::File::open(&self.path).await.map_err(|e| {
            LineServeError::file_error(format!("Failed to open file: {}", self.path.display()), e)
        })?;
        file.seek(SeekFrom::Start(plan.start_offset))
            .await
            .map_err(|e| LineServeError::file_error("Failed to seek", e))?;

        let mut reader = BufReader::new(file);
        let mut line = Vec::new();

        for _ in plan.start_line..=plan.target {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .await
                .map_err(|e| LineServeError::file_error("Failed to read line", e))?;

            if read == 0 || line.last() != Some(&b'\n') {
                return Err(LineServeError::file_error(
                    "File is shorter than its index",
                    std::io::Error::new(ErrorKind::UnexpectedEof, "unexpected end of file"),
                ));
            }
        }

        Ok(line)
    }
}

#[async_trait]
impl LineLookup for OffsetCache {
    async fn lookup(&self, line_number: i64) -> Result<Vec<u8>> {
        let plan = self.plan(line_number)?;
        self.read_planned(plan).await
    }
}
