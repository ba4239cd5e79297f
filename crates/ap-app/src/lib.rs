//! Shared application service layer for aplus.
//!
//! Turns job definitions into session calls: connecting to the host, running
//! the job's steps against one simulation document, and reporting what was
//! read and what went wrong.

pub mod error;
pub mod job_service;
pub mod process_service;

pub use error::{AppError, AppResult};
pub use job_service::{JobReport, ReadResult, StepDiagnostic, connect, run_job, session_config};
pub use process_service::{StrayReport, reap_strays};
