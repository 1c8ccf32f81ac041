//! Attachment to the producer's shared memory region

use crate::error::{TelemetryError, TelemetryResult};
use memmap2::Mmap;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default region path published by the producer
pub const DEFAULT_REGION_PATH: &str = "/dev/shm/maira_telemetry";

/// Delay before re-attempting an attach after the region was not found
pub const ATTACH_RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Read-only attachment to the named region, owned by one session.
///
/// Created unattached; a successful attach is permanent for the session.
/// A failed attach only schedules the next attempt, it never tears down
/// an existing attachment.
#[derive(Debug)]
pub struct RegionHandle {
    path: PathBuf,
    expected_len: usize,
    mmap: Option<Mmap>,
    next_attempt: Option<Instant>,
}

impl RegionHandle {
    /// Handle for the region at `path`, expected to span `expected_len`
    /// bytes under the session's layout
    pub fn new(path: impl Into<PathBuf>, expected_len: usize) -> Self {
        Self {
            path: path.into(),
            expected_len,
            mmap: None,
            next_attempt: None,
        }
    }

    /// Region path this handle opens
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the region has been mapped
    pub fn is_attached(&self) -> bool {
        self.mmap.is_some()
    }

    /// Attach if not yet attached and the backoff deadline allows it.
    ///
    /// Returns true when attached (now or previously). A "not found"
    /// failure is absorbed: it schedules the next attempt and returns
    /// false. Any other failure is fatal for the session.
    pub fn try_ensure_attached(&mut self, now: Instant) -> TelemetryResult<bool> {
        if self.mmap.is_some() {
            return Ok(true);
        }
        if let Some(deadline) = self.next_attempt
            && now < deadline
        {
            return Ok(false);
        }

        match Self::open_region(&self.path) {
            Ok(mmap) => {
                if mmap.len() != self.expected_len {
                    // A short region will surface as a truncated decode;
                    // a long one usually means a producer/layout skew
                    warn!(
                        path = %self.path.display(),
                        mapped = mmap.len(),
                        expected = self.expected_len,
                        "telemetry region length does not match the layout"
                    );
                }
                info!(
                    path = %self.path.display(),
                    mapped = mmap.len(),
                    "attached telemetry region"
                );
                self.mmap = Some(mmap);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(
                    path = %self.path.display(),
                    retry_in_ms = ATTACH_RETRY_DELAY.as_millis() as u64,
                    "telemetry region not found"
                );
                self.next_attempt = Some(now + ATTACH_RETRY_DELAY);
                Ok(false)
            }
            Err(source) => Err(TelemetryError::Attach {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Copy the entire mapped region into `buf` in one bulk operation.
    ///
    /// The whole region — selector field and all slots — is captured in a
    /// single copy, so the slot the reader later selects was captured in
    /// the same transaction as the selector that names it. This is a
    /// best-effort convention, not hardware atomicity: it assumes the
    /// producer finishes writing a slot before advancing the selector.
    pub fn read_snapshot_bytes(&self, buf: &mut Vec<u8>) -> TelemetryResult<()> {
        let mmap = self.mmap.as_ref().ok_or(TelemetryError::NotAttached)?;
        buf.clear();
        buf.extend_from_slice(&mmap[..]);
        Ok(())
    }

    fn open_region(path: &Path) -> std::io::Result<Mmap> {
        let file = OpenOptions::new().read(true).open(path)?;
        // Mapped at file length; a region shorter than the layout is
        // caught by the reader as a truncated decode.
        unsafe { Mmap::map(&file) }
    }
}
