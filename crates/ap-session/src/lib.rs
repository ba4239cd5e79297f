//! ap-session: driving one simulation document.
//!
//! Provides:
//! - `Simulation`: open, configure, run, reinitialize and close a document
//! - `ProcessStream`: batched reads/writes of stream variables by mnemonic
//! - `ProcessBlock`: raw access to a unit-operation block's variables
//! - `StrayProcessReaper`: the system-wide "terminate every host process" fallback
//!
//! # Example
//!
//! ```
//! use ap_core::{PropertyKey, Value};
//! use ap_host::{MemoryNode, MemoryServer};
//! use ap_session::Simulation;
//!
//! let doc = MemoryNode::document();
//! doc.insert_path(r"Data\Streams\S1\Output\TEMP_OUT\MIXED", 350.0);
//! let server = MemoryServer::new().with_document("flowsheet.bkp", doc);
//!
//! let sim = Simulation::open(server, "flowsheet.bkp").unwrap();
//! let s1 = sim.get_stream("S1").unwrap().expect("stream exists");
//! let props = s1.get_properties([PropertyKey::from("TEMP")]);
//! assert_eq!(props[&PropertyKey::from("TEMP")], Value::Real(350.0));
//! ```

pub mod block;
pub mod config;
pub mod outcome;
pub mod reaper;
pub mod simulation;
pub mod stream;

pub use block::ProcessBlock;
pub use config::{CloseOptions, SessionConfig};
pub use outcome::{BatchOutcome, Diagnostic};
pub use reaper::{DEFAULT_STRAY_THRESHOLD, ReapOutcome, StrayProcessReaper};
pub use simulation::{CloseReport, Simulation};
pub use stream::ProcessStream;
