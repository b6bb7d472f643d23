//! Identity newtypes for store contents.
//!
//! Groups and definitions are addressed by exact, case-sensitive names.
//! Definitions additionally carry a stable id that survives across documents
//! and store reloads; lookups by name must keep returning the same id.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name of a definition group, unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(pub String);

impl GroupName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a definition, unique within its group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionName(pub String);

impl DefinitionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefinitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identity of a definition. Assigned once at creation and never
/// reused; the document's binding map is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(pub Uuid);

impl DefinitionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Declared value type of a definition. Fixed at creation; re-requesting a
/// definition with a different type returns the original unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Number,
    Integer,
    Length,
    Area,
    Angle,
    Text,
    YesNo,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Integer => "integer",
            ValueType::Length => "length",
            ValueType::Area => "area",
            ValueType::Angle => "angle",
            ValueType::Text => "text",
            ValueType::YesNo => "yes_no",
        }
    }
}

impl TryFrom<&str> for ValueType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "number" => Ok(ValueType::Number),
            "integer" => Ok(ValueType::Integer),
            "length" => Ok(ValueType::Length),
            "area" => Ok(ValueType::Area),
            "angle" => Ok(ValueType::Angle),
            "text" => Ok(ValueType::Text),
            "yes_no" => Ok(ValueType::YesNo),
            other => bail!("unknown value type: {other}"),
        }
    }
}

/// Shared name validation for groups and definitions. The store format is
/// line-oriented JSON, so the only hard requirements are non-emptiness and
/// the absence of control characters.
pub(crate) fn validate_store_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("{kind} name must not be empty");
    }
    if name.chars().any(char::is_control) {
        bail!("{kind} name must not contain control characters, got {name:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_parse_and_strings_round_trip() {
        let number = ValueType::try_from("number").expect("number parses");
        assert_eq!(number.as_str(), "number");
        let yes_no = ValueType::try_from("yes_no").expect("yes_no parses");
        assert_eq!(yes_no, ValueType::YesNo);
        assert!(ValueType::try_from("decimal").is_err());
    }

    #[test]
    fn store_names_reject_empty_and_control_chars() {
        assert!(validate_store_name("group", "Coursework Parameters").is_ok());
        assert!(validate_store_name("group", "   ").is_err());
        assert!(validate_store_name("definition", "bad\nname").is_err());
    }
}
