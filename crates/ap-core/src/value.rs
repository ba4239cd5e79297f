//! Scalar values stored in the host variable tree.

use core::fmt;

/// A scalar read from or written to a variable tree node.
///
/// Most nodes hold numbers. Specification nodes such as `FLOWBASIS` or
/// `FLASHTYPE` hold categorical text (`"MOLE"`, `"TP"`). Units are whatever the
/// document is configured with; no conversion happens here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Int(i64),
    Real(f64),
    Text(String),
    /// Node exists but carries no value (not yet calculated, or left blank).
    Empty,
}

impl Value {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(x) => Some(*x),
            Value::Text(_) | Value::Empty => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a command-line literal: integers, then reals, otherwise text.
    pub fn parse_literal(s: &str) -> Self {
        let s = s.trim();
        if let Ok(i) = s.parse::<i64>() {
            Value::Int(i)
        } else if let Ok(x) = s.parse::<f64>() {
            Value::Real(x)
        } else {
            Value::Text(s.to_string())
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Empty => write!(f, "<empty>"),
        }
    }
}
