//! Runtime session settings.

use crate::reaper::DEFAULT_STRAY_THRESHOLD;
use ap_host::{DEFAULT_PROCESS_IMAGE, DEFAULT_PROG_ID};

/// How a simulation is opened and configured.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Automation class of the host application.
    pub prog_id: String,
    /// `None` leaves the host's own default in place.
    pub visible: Option<bool>,
    /// `None` leaves the host's own default in place.
    pub suppress_dialogs: Option<bool>,
    pub close: CloseOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prog_id: DEFAULT_PROG_ID.to_string(),
            visible: None,
            suppress_dialogs: None,
            close: CloseOptions::default(),
        }
    }
}

/// What happens after the document is closed.
///
/// With `kill_stray` set (the default), closing lists every process running
/// `process_image` and, if more than `stray_threshold` lines are listed,
/// terminates all of them. This may close unrelated instances of the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseOptions {
    pub kill_stray: bool,
    pub stray_threshold: usize,
    pub process_image: String,
}

impl CloseOptions {
    /// Close the document only; never touch other processes.
    pub fn soft() -> Self {
        Self {
            kill_stray: false,
            ..Self::default()
        }
    }
}

impl Default for CloseOptions {
    fn default() -> Self {
        Self {
            kill_stray: true,
            stray_threshold: DEFAULT_STRAY_THRESHOLD,
            process_image: DEFAULT_PROCESS_IMAGE.to_string(),
        }
    }
}
