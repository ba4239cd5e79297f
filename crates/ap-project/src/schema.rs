//! Job schema definitions.

use ap_core::{PropertyKey, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Simulation document (e.g. a `.bkp` archive).
    pub simulation: PathBuf,
    #[serde(default)]
    pub session: SessionDef,
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDef {
    #[serde(default = "default_prog_id")]
    pub prog_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_dialogs: Option<bool>,
    #[serde(default)]
    pub close: CloseDef,
}

impl Default for SessionDef {
    fn default() -> Self {
        Self {
            prog_id: default_prog_id(),
            visible: None,
            suppress_dialogs: None,
            close: CloseDef::default(),
        }
    }
}

/// After-close cleanup. `kill_stray` terminates every host process when more
/// than `stray_threshold` lines are listed for `process_image`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CloseDef {
    #[serde(default = "default_kill_stray")]
    pub kill_stray: bool,
    #[serde(default = "default_stray_threshold")]
    pub stray_threshold: usize,
    #[serde(default = "default_process_image")]
    pub process_image: String,
}

impl Default for CloseDef {
    fn default() -> Self {
        Self {
            kill_stray: default_kill_stray(),
            stray_threshold: default_stray_threshold(),
            process_image: default_process_image(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDef {
    /// Write stream specifications.
    Set {
        stream: String,
        values: BTreeMap<PropertyKey, Value>,
    },
    Run,
    Reinit,
    /// Read stream results.
    Get {
        stream: String,
        #[serde(default)]
        keys: Vec<PropertyKey>,
    },
}

fn default_prog_id() -> String {
    "Apwn.Document".to_string()
}

fn default_kill_stray() -> bool {
    true
}

fn default_stray_threshold() -> usize {
    2
}

fn default_process_image() -> String {
    "AspenPlus.exe".to_string()
}
