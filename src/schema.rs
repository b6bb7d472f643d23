//! Bundled JSON Schema enforcement for store records.
//!
//! Every line of a definition store is validated against the
//! `param_store_v1` schema before typed parsing, so a store written by
//! another process (or hand-edited) fails loudly instead of deserializing
//! into something surprising. The schema ships embedded; `schemas/` holds
//! the canonical copy.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::sync::OnceLock;

const RAW_STORE_SCHEMA: &str = include_str!("../schemas/param_store_v1.json");

fn store_record_schema() -> Result<&'static Value> {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    if let Some(schema) = SCHEMA.get() {
        return Ok(schema);
    }
    let parsed: Value =
        serde_json::from_str(RAW_STORE_SCHEMA).context("parsing bundled param_store_v1 schema")?;
    Ok(SCHEMA.get_or_init(|| parsed))
}

/// Validate one store line against the bundled record schema.
pub(crate) fn validate_store_record(record: &Value) -> Result<()> {
    let schema = store_record_schema()?;
    if !jsonschema::is_valid(schema, record) {
        bail!("record does not match the param_store_v1 schema");
    }
    Ok(())
}
