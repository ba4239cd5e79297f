//! System-wide listing and termination of host processes.

use crate::error::{HostError, HostResult};
use std::process::{Command, Stdio};
use tracing::debug;

/// Executable image name of the host application.
pub const DEFAULT_PROCESS_IMAGE: &str = "AspenPlus.exe";

/// OS process table, queried by executable image name.
///
/// Both operations are global: they see and affect every process with that
/// image, not only those started by this program.
pub trait ProcessTable {
    /// Listing lines produced for `image`, headers and blank lines included.
    fn list(&self, image: &str) -> HostResult<Vec<String>>;

    /// Force-terminate every process running `image`.
    fn terminate_all(&self, image: &str) -> HostResult<()>;
}

/// Process table backed by the `WMIC` command-line utility.
#[derive(Debug, Clone, Copy, Default)]
pub struct WmicProcessTable;

impl WmicProcessTable {
    fn filter(image: &str) -> String {
        format!("name='{}'", image)
    }
}

impl ProcessTable for WmicProcessTable {
    fn list(&self, image: &str) -> HostResult<Vec<String>> {
        let output = Command::new("WMIC")
            .args(["PROCESS", "where", &Self::filter(image)])
            .args(["get", "Caption,Commandline,Processid"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| HostError::Process {
                message: format!("failed to run WMIC: {}", e),
            })?;

        let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        debug!(image, lines = lines.len(), "listed host processes");
        Ok(lines)
    }

    fn terminate_all(&self, image: &str) -> HostResult<()> {
        let status = Command::new("wmic")
            .args(["process", "where", &Self::filter(image), "call", "terminate"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| HostError::Process {
                message: format!("failed to run wmic: {}", e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(HostError::Process {
                message: format!("wmic terminate exited with {}", status),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_quotes_image_name() {
        assert_eq!(
            WmicProcessTable::filter(DEFAULT_PROCESS_IMAGE),
            "name='AspenPlus.exe'"
        );
    }
}
