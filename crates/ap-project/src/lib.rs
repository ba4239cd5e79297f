//! ap-project: job file format and validation.
//!
//! A job names a simulation document, how to open and close it, and the
//! steps to perform on it (set stream inputs, run, reinitialize, read stream
//! results). Jobs are stored as YAML or JSON.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_job};

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse and validate a job from YAML text.
pub fn parse_yaml(content: &str) -> ProjectResult<Job> {
    let job: Job = serde_yaml::from_str(content)?;
    validate_job(&job)?;
    Ok(job)
}

/// Load a job file, YAML or (by `.json` extension) JSON.
///
/// A relative `simulation` path is taken relative to the job file's directory.
pub fn load_job(path: &Path) -> ProjectResult<Job> {
    let content = std::fs::read_to_string(path)?;
    let mut job: Job = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    validate_job(&job)?;

    if job.simulation.is_relative()
        && let Some(dir) = path.parent()
    {
        job.simulation = dir.join(&job.simulation);
    }
    Ok(job)
}

pub fn save_yaml(path: &Path, job: &Job) -> ProjectResult<()> {
    validate_job(job)?;
    let content = serde_yaml::to_string(job)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn save_json(path: &Path, job: &Job) -> ProjectResult<()> {
    validate_job(job)?;
    let content = serde_json::to_string_pretty(job)?;
    std::fs::write(path, content)?;
    Ok(())
}
