//! Allow-list-gated driver attributes.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DriveError, Result};

/// A scalar attribute value, rendered as a MIF token.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Integer(i64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(v) => write!(f, "{v:?}"),
            AttrValue::Integer(v) => write!(f, "{v}"),
            // MIF booleans are 0/1.
            AttrValue::Bool(v) => write!(f, "{}", if *v { 1 } else { 0 }),
            AttrValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Integer(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

/// Named optional attributes for one driver variant.
///
/// Unset attributes are omitted from the generated script; the engine applies
/// its own defaults. Validation against a variant's allow-list happens when
/// the attributes are handed to the variant, before any other validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverAttrs {
    values: BTreeMap<String, AttrValue>,
}

impl DriverAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute (builder style).
    pub fn set(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reject any attribute not present in `allowed`.
    pub fn check_allowed(&self, driver: &'static str, allowed: &[&str]) -> Result<()> {
        for name in self.values.keys() {
            if !allowed.contains(&name.as_str()) {
                return Err(DriveError::UnknownAttribute {
                    driver,
                    attribute: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Append set attributes to a driver block, in allow-list order, skipping
    /// `skip` (names the driver emits itself).
    pub fn emit(&self, allowed: &[&str], skip: &[&str], out: &mut String) {
        for name in allowed {
            if skip.contains(name) {
                continue;
            }
            if let Some(value) = self.values.get(*name) {
                out.push_str(&format!("  {name} {value}\n"));
            }
        }
    }
}
