//! Shared parameter toolkit.
//!
//! `parambind` manages reusable, named parameter definitions in an external,
//! file-backed store shared across documents, and binds them to sets of
//! entity categories inside a host document model. The workflow is
//! idempotent: rerunning it against a document that already carries the
//! parameter changes nothing, and rebinding always merges with — never
//! clobbers — categories bound by earlier operations.
//!
//! The host document (category lookup, element enumeration, binding map,
//! edit scope) is reached only through [`document::DocumentModel`];
//! [`document::MemoryDocument`] is the reference host used by the CLI and
//! the tests.

pub mod binding;
pub mod document;
pub mod error;
mod schema;
pub mod store;
pub mod workflow;

pub use binding::{
    BindReport, BindState, BindingKind, CategoryAccumulator, CategorySet, bind_definition,
};
pub use document::{
    BoundParameter, Category, CategoryKey, DocumentModel, Element, ElementKind, MemoryDocument,
};
pub use error::{BindError, HostFailure};
pub use store::{
    Definition, DefinitionFile, DefinitionGroup, DefinitionId, DefinitionName, GroupName,
    STORE_SCHEMA_VERSION, StoreAccessor, ValueType,
};
pub use workflow::{EnsureReport, EnsureRequest, ensure_parameter, find_existing_parameter};

use std::env;
use std::path::PathBuf;

/// Default store filename, relative to the working directory, used when
/// neither the caller nor the environment names a path.
pub const DEFAULT_STORE_FILENAME: &str = "shared_params.jsonl";

/// Environment override for the store path.
pub const ENV_STORE_PATH: &str = "PARAMBIND_SHARED_STORE";

/// Resolve the store path for an accessor with no configured path: the
/// `PARAMBIND_SHARED_STORE` environment variable when set and non-empty,
/// else the fixed default filename.
pub fn default_store_path() -> PathBuf {
    store_path_from(env::var(ENV_STORE_PATH).ok())
}

fn store_path_from(raw: Option<String>) -> PathBuf {
    match raw {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_STORE_FILENAME),
    }
}

/// Split a comma- or whitespace-separated list argument.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_path_prefers_the_override() {
        assert_eq!(
            store_path_from(Some("/tmp/params.jsonl".to_string())),
            PathBuf::from("/tmp/params.jsonl")
        );
        assert_eq!(
            store_path_from(Some("   ".to_string())),
            PathBuf::from(DEFAULT_STORE_FILENAME)
        );
        assert_eq!(store_path_from(None), PathBuf::from(DEFAULT_STORE_FILENAME));
    }

    #[test]
    fn split_list_handles_commas_and_whitespace() {
        assert_eq!(split_list("doors,walls windows"), vec!["doors", "walls", "windows"]);
        assert_eq!(split_list(" , "), Vec::<String>::new());
    }
}
