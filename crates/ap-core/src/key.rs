//! Property keys as callers write them.

use crate::error::ApError;
use crate::mnemonic::{Mnemonic, ReadProperty, WriteProperty};
use crate::value::Value;
use core::fmt;
use std::collections::BTreeMap;

/// Mapping from property key to value, used both for read results and write inputs.
pub type PropertyMap = BTreeMap<PropertyKey, Value>;

/// A property mnemonic, optionally qualified by a chemical component.
///
/// The mnemonic is kept exactly as given so that a key that is not in any
/// table can still be reported back to the caller by name. Text form is
/// `TEMP` or `COMPMOLEFLOW:CO2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey {
    mnemonic: String,
    component: Option<String>,
}

impl PropertyKey {
    pub fn new(mnemonic: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            component: None,
        }
    }

    pub fn with_component(mnemonic: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            component: Some(component.into()),
        }
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(c) => write!(f, "{}:{}", self.mnemonic, c),
            None => write!(f, "{}", self.mnemonic),
        }
    }
}

impl std::str::FromStr for PropertyKey {
    type Err = ApError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mnemonic, component) = match s.trim().split_once(':') {
            Some((m, c)) => (m.trim(), Some(c.trim())),
            None => (s.trim(), None),
        };
        if mnemonic.is_empty() || component.is_some_and(str::is_empty) {
            return Err(ApError::MalformedKey {
                text: s.to_string(),
            });
        }
        Ok(Self {
            mnemonic: mnemonic.to_string(),
            component: component.map(str::to_string),
        })
    }
}

impl From<&str> for PropertyKey {
    fn from(mnemonic: &str) -> Self {
        Self::new(mnemonic)
    }
}

impl From<(&str, &str)> for PropertyKey {
    fn from((mnemonic, component): (&str, &str)) -> Self {
        Self::with_component(mnemonic, component)
    }
}

impl From<ReadProperty> for PropertyKey {
    fn from(p: ReadProperty) -> Self {
        Self::new(p.key())
    }
}

impl From<WriteProperty> for PropertyKey {
    fn from(p: WriteProperty) -> Self {
        Self::new(p.key())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PropertyKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PropertyKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
