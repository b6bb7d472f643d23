//! On-disk record model for the definition store.
//!
//! A store is a UTF-8 JSON Lines file: one record per line, appended and
//! never rewritten. The first line of a non-empty store is a header carrying
//! the schema version; group and definition records follow in append order.
//! Reads validate every line against the bundled schema before typed
//! parsing.

use crate::schema::validate_store_record;
use crate::store::identity::{DefinitionId, DefinitionName, GroupName, ValueType};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Version marker written as the first line of every store file.
pub const STORE_SCHEMA_VERSION: &str = "param_store_v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum StoreRecord {
    Header(HeaderRecord),
    Group(GroupRecord),
    Definition(Definition),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderRecord {
    pub schema_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: GroupName,
}

/// A named, typed parameter declaration. Identity, declared type, and the
/// visibility flag are fixed at creation; lookups return the stored shape
/// unchanged regardless of what the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub group: GroupName,
    pub name: DefinitionName,
    pub id: DefinitionId,
    pub value_type: ValueType,
    pub visible: bool,
}

/// Create the store file if it is missing. Opening in append mode is
/// side-effect-free on existing contents.
pub(crate) fn touch_store(path: &Path) -> Result<()> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("creating store file {}", path.display()))?;
    Ok(())
}

/// Read and validate every content record in the store. The header is
/// checked and stripped; an empty file is an empty store.
pub(crate) fn read_records(path: &Path) -> Result<Vec<StoreRecord>> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading store {}", path.display()))?;

    let mut records = Vec::new();
    let mut saw_header = false;
    for (idx, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("parsing store line {}", idx + 1))?;
        validate_store_record(&value).with_context(|| format!("store line {}", idx + 1))?;
        let record: StoreRecord = serde_json::from_value(value)
            .with_context(|| format!("decoding store line {}", idx + 1))?;

        match record {
            StoreRecord::Header(header) => {
                if saw_header {
                    bail!("duplicate header at store line {}", idx + 1);
                }
                if !records.is_empty() {
                    bail!("header must be the first record, found it at line {}", idx + 1);
                }
                if header.schema_version != STORE_SCHEMA_VERSION {
                    bail!(
                        "unsupported store schema version '{}', expected {}",
                        header.schema_version,
                        STORE_SCHEMA_VERSION
                    );
                }
                saw_header = true;
            }
            other => {
                if !saw_header {
                    bail!("store is missing its header record");
                }
                records.push(other);
            }
        }
    }
    Ok(records)
}

/// Append one content record, writing the header first when the file is
/// still empty.
pub(crate) fn append_record(path: &Path, record: &StoreRecord) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("opening store {} for append", path.display()))?;

    let len = file
        .metadata()
        .with_context(|| format!("inspecting store {}", path.display()))?
        .len();
    if len == 0 {
        let header = StoreRecord::Header(HeaderRecord {
            schema_version: STORE_SCHEMA_VERSION.to_string(),
        });
        writeln!(file, "{}", serde_json::to_string(&header)?)
            .with_context(|| format!("writing store header to {}", path.display()))?;
    }

    writeln!(file, "{}", serde_json::to_string(record)?)
        .with_context(|| format!("appending record to {}", path.display()))?;
    Ok(())
}
