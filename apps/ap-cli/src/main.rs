use ap_app::{AppError, AppResult, JobReport};
use ap_core::{Mnemonic, PropertyKey, ReadProperty, Value, WriteProperty};
use ap_host::{DEFAULT_PROCESS_IMAGE, DEFAULT_PROG_ID, WmicProcessTable};
use ap_project::{CloseDef, Job, SessionDef, StepDef, load_job, validate_job};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "ap-cli")]
#[command(about = "aplus CLI - drive process simulation documents through COM automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read stream results
    Get {
        /// Simulation document (e.g. a .bkp archive)
        simulation: PathBuf,
        /// Stream name
        stream: String,
        /// Property keys, e.g. TEMP PRES COMPMOLEFLOW:CO2
        #[arg(required = true)]
        keys: Vec<PropertyKey>,
        /// Run the simulation before reading
        #[arg(long)]
        run: bool,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Write stream specifications
    Set {
        /// Simulation document (e.g. a .bkp archive)
        simulation: PathBuf,
        /// Stream name
        stream: String,
        /// Assignments, e.g. TEMP=320 FLOWBASIS=MOLE COMPFLOW:CO2=0.2
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(PropertyKey, Value)>,
        /// Run the simulation after writing
        #[arg(long)]
        run: bool,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Execute a job file (YAML or JSON)
    Job {
        /// Path to the job file
        job_path: PathBuf,
    },
    /// Check a job file without touching the host
    Validate {
        /// Path to the job file
        job_path: PathBuf,
    },
    /// Terminate ALL host processes if more than the threshold are listed
    Reap {
        /// Executable image name
        #[arg(long, default_value = DEFAULT_PROCESS_IMAGE)]
        image: String,
        /// Listed lines tolerated before terminating
        #[arg(long, default_value_t = 2)]
        threshold: usize,
    },
    /// Print the mnemonic tables and the variable paths they map to
    Paths,
}

#[derive(Args)]
struct SessionArgs {
    /// Automation ProgID of the host
    #[arg(long, default_value = DEFAULT_PROG_ID)]
    prog_id: String,
    /// Show the host window
    #[arg(long)]
    visible: bool,
    /// Let the host show its confirmation dialogs
    #[arg(long)]
    allow_dialogs: bool,
    /// Do not terminate stray host processes after closing
    #[arg(long)]
    no_kill_stray: bool,
    /// Listed lines tolerated before stray processes are terminated
    #[arg(long, default_value_t = 2)]
    stray_threshold: usize,
}

impl SessionArgs {
    fn into_def(self) -> SessionDef {
        SessionDef {
            prog_id: self.prog_id,
            visible: Some(self.visible),
            suppress_dialogs: Some(!self.allow_dialogs),
            close: CloseDef {
                kill_stray: !self.no_kill_stray,
                stray_threshold: self.stray_threshold,
                process_image: DEFAULT_PROCESS_IMAGE.to_string(),
            },
        }
    }
}

fn parse_assignment(s: &str) -> Result<(PropertyKey, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.parse::<PropertyKey>().map_err(|e| e.to_string())?;
    Ok((key, Value::parse_literal(value)))
}

fn main() -> AppResult<()> {
    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Get {
            simulation,
            stream,
            keys,
            run,
            session,
        } => {
            let mut steps = Vec::new();
            if run {
                steps.push(StepDef::Run);
            }
            steps.push(StepDef::Get { stream, keys });
            cmd_job(&Job {
                simulation,
                session: session.into_def(),
                steps,
            })
        }
        Commands::Set {
            simulation,
            stream,
            assignments,
            run,
            session,
        } => {
            let values: BTreeMap<_, _> = assignments.into_iter().collect();
            let mut steps = vec![StepDef::Set { stream, values }];
            if run {
                steps.push(StepDef::Run);
            }
            cmd_job(&Job {
                simulation,
                session: session.into_def(),
                steps,
            })
        }
        Commands::Job { job_path } => cmd_job(&load_job(&job_path)?),
        Commands::Validate { job_path } => cmd_validate(&job_path),
        Commands::Reap { image, threshold } => cmd_reap(&image, threshold),
        Commands::Paths => {
            cmd_paths();
            Ok(())
        }
    }
}

fn cmd_job(job: &Job) -> AppResult<()> {
    validate_job(job).map_err(|e| AppError::InvalidInput(e.to_string()))?;
    info!(simulation = %job.simulation.display(), "connecting to host");
    let server = ap_app::connect(&job.session.prog_id)?;
    let report = ap_app::run_job(server, job, &WmicProcessTable)?;
    print_report(&report)
}

fn print_report(report: &JobReport) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    if let Some(stray) = &report.stray {
        if stray.terminated {
            eprintln!("FORCEFULLY closed all host processes");
        }
        if let Some(error) = &stray.error {
            eprintln!("Stray process cleanup failed: {}", error);
        }
    }
    Ok(())
}

fn cmd_validate(job_path: &Path) -> AppResult<()> {
    println!("Validating job: {}", job_path.display());
    let job = load_job(job_path)?;
    println!(
        "✓ Job is valid: {} step(s) on {}",
        job.steps.len(),
        job.simulation.display()
    );
    Ok(())
}

fn cmd_reap(image: &str, threshold: usize) -> AppResult<()> {
    let report = ap_app::reap_strays(&WmicProcessTable, image, threshold)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_paths() {
    println!("Read (stream results):");
    print_table(ReadProperty::ALL);
    println!();
    println!("Write (stream specifications):");
    print_table(WriteProperty::ALL);
}

fn print_table<M: Mnemonic>(all: &[M]) {
    for m in all {
        let component = if m.takes_component() { ":<component>" } else { "" };
        let key = format!("{}{}", m.key(), component);
        let path = m.path(m.takes_component().then_some("<component>"));
        println!("  {:<28} {}", key, path);
    }
}
