//! Job execution against one simulation document.

use std::path::PathBuf;
use std::time::Instant;

use ap_core::{ApError, ApResult, EntityKind, PropertyMap};
use ap_host::{AutomationServer, ComServer, ProcessTable};
use ap_project::{Job, SessionDef, StepDef};
use ap_session::{BatchOutcome, CloseOptions, SessionConfig, Simulation};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::process_service::StrayReport;

/// Values read by one `get` step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResult {
    pub step: usize,
    pub stream: String,
    pub values: PropertyMap,
}

/// Something that went wrong in one step without aborting the job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDiagnostic {
    pub step: usize,
    pub stream: String,
    pub message: String,
}

/// Outcome of a job run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobReport {
    pub simulation: PathBuf,
    pub reads: Vec<ReadResult>,
    /// Number of stream values successfully assigned.
    pub written: usize,
    pub runs: usize,
    pub diagnostics: Vec<StepDiagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stray: Option<StrayReport>,
}

impl JobReport {
    fn note(&mut self, step: usize, stream: &str, message: String) {
        self.diagnostics.push(StepDiagnostic {
            step,
            stream: stream.to_string(),
            message,
        });
    }

    fn absorb(&mut self, step: usize, stream: &str, outcome: &BatchOutcome) {
        for diag in &outcome.diagnostics {
            self.note(step, stream, diag.to_string());
        }
    }
}

/// Runtime session settings for a job's session definition.
pub fn session_config(def: &SessionDef) -> SessionConfig {
    SessionConfig {
        prog_id: def.prog_id.clone(),
        visible: def.visible,
        suppress_dialogs: def.suppress_dialogs,
        close: CloseOptions {
            kill_stray: def.close.kill_stray,
            stray_threshold: def.close.stray_threshold,
            process_image: def.close.process_image.clone(),
        },
    }
}

/// Create the host automation server.
pub fn connect(prog_id: &str) -> AppResult<ComServer> {
    Ok(ComServer::connect(prog_id)?)
}

/// Open the job's document, execute its steps in order, and close it.
///
/// A missing stream or a bad key is recorded in the report and the job goes
/// on; host failures during run/reinit abort it. The document is closed in
/// every case, following the job's close settings. A failed stray process
/// cleanup is recorded in the report's `stray` section and does not fail the job.
pub fn run_job<S, P>(server: S, job: &Job, processes: &P) -> AppResult<JobReport>
where
    S: AutomationServer,
    P: ProcessTable + ?Sized,
{
    let config = session_config(&job.session);
    let started = Instant::now();
    let (mut report, closed) = Simulation::scoped(
        server,
        &job.simulation,
        &config,
        processes,
        |sim| execute_steps(sim, &job.steps),
    )?;
    report.simulation = job.simulation.clone();
    report.stray = StrayReport::from_close(closed);
    info!(
        simulation = %job.simulation.display(),
        steps = job.steps.len(),
        diagnostics = report.diagnostics.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "job finished"
    );
    Ok(report)
}

fn execute_steps<S: AutomationServer>(
    sim: &Simulation<S>,
    steps: &[StepDef],
) -> ApResult<JobReport> {
    let mut report = JobReport::default();

    for (i, step) in steps.iter().enumerate() {
        match step {
            StepDef::Run => {
                sim.run()?;
                report.runs += 1;
            }
            StepDef::Reinit => sim.reinit()?,
            StepDef::Set { stream, values } => {
                let Some(s) = sim.get_stream(stream)? else {
                    missing_stream(&mut report, i, stream);
                    continue;
                };
                let outcome = s.set_properties_report(values);
                report.written += outcome.values.len();
                report.absorb(i, stream, &outcome);
            }
            StepDef::Get { stream, keys } => {
                let Some(s) = sim.get_stream(stream)? else {
                    missing_stream(&mut report, i, stream);
                    continue;
                };
                let outcome = s.get_properties_report(keys.iter().cloned());
                report.absorb(i, stream, &outcome);
                report.reads.push(ReadResult {
                    step: i,
                    stream: stream.clone(),
                    values: outcome.values,
                });
            }
        }
    }

    Ok(report)
}

fn missing_stream(report: &mut JobReport, step: usize, stream: &str) {
    warn!(step, stream, "skipping step");
    let absent = ApError::LookupAbsent {
        kind: EntityKind::Stream,
        name: stream.to_string(),
    };
    report.note(step, stream, absent.to_string());
}
