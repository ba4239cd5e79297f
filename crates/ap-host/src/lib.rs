//! ap-host: access to the simulation host application.
//!
//! Provides:
//! - `AutomationServer` / `HostNode` traits: the narrow surface the rest of
//!   aplus needs from the host (load, configure, run, close, variable tree)
//! - `MemoryServer`: an in-memory host with document fixtures, for tests and dry runs
//! - `ComServer`: the real host, driven through COM automation (Windows only)
//! - `ProcessTable`: listing and terminating host processes by image name
//!
//! # Example
//!
//! ```
//! use ap_host::{AutomationServer, HostNode, MemoryNode, MemoryServer};
//! use std::path::Path;
//!
//! let doc = MemoryNode::document();
//! doc.insert_path(r"Data\Streams\S1\Output\TEMP_OUT\MIXED", 350.0);
//! let server = MemoryServer::new().with_document("flowsheet.bkp", doc);
//!
//! server.load_document(Path::new("flowsheet.bkp")).unwrap();
//! let node = server
//!     .tree()
//!     .unwrap()
//!     .find_node(r"Data\Streams\S1\Output\TEMP_OUT\MIXED")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(node.value().unwrap().as_f64(), Some(350.0));
//! ```

pub mod com;
pub mod error;
pub mod memory;
pub mod process;
pub mod server;

pub use com::{ComNode, ComServer, DEFAULT_PROG_ID};
pub use error::{HostError, HostResult};
pub use memory::{MemoryNode, MemoryServer, ServerCall};
pub use process::{DEFAULT_PROCESS_IMAGE, ProcessTable, WmicProcessTable};
pub use server::{AutomationServer, HostNode};
