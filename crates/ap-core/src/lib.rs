//! ap-core: stable foundation for aplus.
//!
//! Contains:
//! - value (host scalar values)
//! - key (property keys as callers write them)
//! - mnemonic (fixed read/write tables and host path resolution)
//! - error (shared error types)

pub mod error;
pub mod key;
pub mod mnemonic;
pub mod value;

pub use error::{ApError, ApResult, EntityKind};
pub use key::{PropertyKey, PropertyMap};
pub use mnemonic::{Mnemonic, ReadProperty, WriteProperty, resolve_path};
pub use value::Value;
