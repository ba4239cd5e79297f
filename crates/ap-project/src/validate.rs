//! Job validation logic.

use crate::schema::{Job, StepDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Missing value: {field}")]
    Missing { field: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_job(job: &Job) -> Result<(), ValidationError> {
    if job.simulation.as_os_str().is_empty() {
        return Err(ValidationError::Missing {
            field: "simulation".to_string(),
        });
    }

    if job.session.prog_id.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: "session.prog_id".to_string(),
        });
    }

    let image = &job.session.close.process_image;
    if job.session.close.kill_stray && image.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "session.close.process_image".to_string(),
            value: image.clone(),
            reason: "required when kill_stray is set".to_string(),
        });
    }

    for (i, step) in job.steps.iter().enumerate() {
        match step {
            StepDef::Set { stream, values } => {
                check_stream(i, stream)?;
                if values.is_empty() {
                    return Err(ValidationError::Missing {
                        field: format!("steps[{}].values", i),
                    });
                }
            }
            StepDef::Get { stream, .. } => check_stream(i, stream)?,
            StepDef::Run | StepDef::Reinit => {}
        }
    }

    Ok(())
}

fn check_stream(index: usize, stream: &str) -> Result<(), ValidationError> {
    if stream.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: format!("steps[{}].stream", index),
        });
    }
    Ok(())
}
