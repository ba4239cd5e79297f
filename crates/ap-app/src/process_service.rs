//! Stand-alone stray process cleanup.

use ap_host::ProcessTable;
use ap_session::{CloseReport, ReapOutcome, StrayProcessReaper};
use serde::Serialize;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrayReport {
    pub listed: usize,
    pub terminated: bool,
    /// Set when the process table could not be listed or cleared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StrayReport {
    /// Cleanup part of a close report; `None` if cleanup was not requested.
    pub fn from_close(report: CloseReport) -> Option<Self> {
        match (report.stray, report.stray_error) {
            (Some(outcome), _) => Some(outcome.into()),
            (None, Some(error)) => Some(Self {
                listed: 0,
                terminated: false,
                error: Some(error),
            }),
            (None, None) => None,
        }
    }
}

impl From<ReapOutcome> for StrayReport {
    fn from(outcome: ReapOutcome) -> Self {
        Self {
            listed: outcome.listed,
            terminated: outcome.terminated,
            error: None,
        }
    }
}

/// Terminate every `image` process if more than `threshold` lines are listed.
///
/// Affects all instances on the machine, not only ones started by aplus.
pub fn reap_strays<P>(processes: &P, image: &str, threshold: usize) -> AppResult<StrayReport>
where
    P: ProcessTable + ?Sized,
{
    let outcome = StrayProcessReaper::new(processes, threshold).reap(image)?;
    Ok(outcome.into())
}
