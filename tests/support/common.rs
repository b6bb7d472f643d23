#![allow(dead_code)]

// Shared fixtures for the integration tests: a document with the usual
// building categories, a standard ensure request, and store-file probes.

use parambind::{
    BindingKind, CategoryKey, DefinitionName, Element, ElementKind, EnsureRequest, GroupName,
    MemoryDocument, ValueType,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const GROUP: &str = "Coursework Parameters";

/// Building categories that accept user-visible bound parameters, plus
/// `model_groups`, which does not.
pub fn sample_document() -> MemoryDocument {
    MemoryDocument::new()
        .with_category("doors", "Doors", true)
        .with_category("walls", "Walls", true)
        .with_category("windows", "Windows", true)
        .with_category("floors", "Floors", true)
        .with_category("roofs", "Roofs", true)
        .with_category("model_groups", "Model Groups", false)
}

pub fn sample_request(name: &str, categories: &[&str]) -> EnsureRequest {
    EnsureRequest {
        name: DefinitionName::new(name),
        group: GroupName::new(GROUP),
        value_type: ValueType::Number,
        kind: BindingKind::Instance,
        categories: categories.iter().map(|key| CategoryKey::new(*key)).collect(),
    }
}

/// A pre-existing element that already exposes `parameter`.
pub fn element_with_parameter(id: u64, parameter: &str) -> Element {
    Element {
        id,
        kind: ElementKind::SharedParameterElement,
        parameters: BTreeSet::from([parameter.to_string()]),
    }
}

/// Fresh store location. The file itself is not created; keep the TempDir
/// alive for the duration of the test.
pub fn store_location() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("shared_params.jsonl");
    (dir, path)
}

/// Non-blank line count of the store file; zero when the file is absent.
pub fn store_line_count(path: &Path) -> usize {
    match fs::read_to_string(path) {
        Ok(data) => data.lines().filter(|line| !line.trim().is_empty()).count(),
        Err(_) => 0,
    }
}
