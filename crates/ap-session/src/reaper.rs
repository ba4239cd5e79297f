//! Forced termination of leftover host processes.
//!
//! The host is known to leave orphan processes behind after `Quit`. The only
//! reliable cleanup is blunt: count what the process utility lists for the host
//! image and, above a small threshold, terminate every one of them. The
//! threshold allows for the listing's own header and trailing lines.

use ap_core::ApResult;
use ap_host::ProcessTable;
use tracing::{debug, warn};

/// Listed lines tolerated before termination kicks in.
pub const DEFAULT_STRAY_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReapOutcome {
    /// Lines the process utility listed for the image.
    pub listed: usize,
    pub terminated: bool,
}

/// Terminates ALL processes of a given image when too many are listed.
///
/// This is system-wide: instances opened by other programs or users are
/// terminated too.
pub struct StrayProcessReaper<'a, P: ProcessTable + ?Sized> {
    table: &'a P,
    threshold: usize,
}

impl<'a, P: ProcessTable + ?Sized> StrayProcessReaper<'a, P> {
    pub fn new(table: &'a P, threshold: usize) -> Self {
        Self { table, threshold }
    }

    pub fn reap(&self, image: &str) -> ApResult<ReapOutcome> {
        let listed = self.table.list(image)?.len();
        if listed <= self.threshold {
            debug!(image, listed, threshold = self.threshold, "no stray host processes");
            return Ok(ReapOutcome {
                listed,
                terminated: false,
            });
        }

        self.table.terminate_all(image)?;
        warn!(
            image,
            listed,
            threshold = self.threshold,
            "FORCEFULLY terminated all host processes; unrelated instances may have been closed"
        );
        Ok(ReapOutcome {
            listed,
            terminated: true,
        })
    }
}
