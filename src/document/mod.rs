//! Host document-model collaborator.
//!
//! The workflow drives a document only through the `DocumentModel` trait:
//! category lookup, parameter-element enumeration, binding-map reads and
//! writes, and the edit scope. The core never implements host behavior; the
//! in-memory reference host in `memory` exists for the CLI and the test
//! suite.

pub mod memory;

pub use memory::MemoryDocument;

use crate::binding::{BindingKind, CategorySet};
use crate::error::HostFailure;
use crate::store::{Definition, DefinitionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Symbolic identifier of an entity category (for example `doors`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(pub String);

impl CategoryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved category handle.
///
/// `allows_bound_parameters` is the capability from which a definition's
/// visibility flag is computed at creation time; categories that refuse
/// user-visible bound parameters can still carry non-visible ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: CategoryKey,
    pub name: String,
    pub allows_bound_parameters: bool,
}

/// Kind of a parameter-bearing element surfaced by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    SharedParameterElement,
    ParameterElement,
}

/// One parameter-bearing element. Only the exposed parameter names matter to
/// the idempotency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: u64,
    pub kind: ElementKind,
    #[serde(default)]
    pub parameters: BTreeSet<String>,
}

/// An entry in the document's binding map: the association of one definition
/// with a category set and a scope kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundParameter {
    pub kind: BindingKind,
    pub categories: CategorySet,
}

/// Opaque host capabilities the workflow relies on.
///
/// `category` keeps "absent" and "lookup failed" apart: `Ok(None)` means the
/// key names nothing in this document, `Err` means the host itself failed.
/// Both skip the category in a batch, with distinct reported reasons.
pub trait DocumentModel {
    fn category(&self, key: &CategoryKey) -> Result<Option<Category>, HostFailure>;

    /// Deduplicated parameter-bearing elements (shared-parameter and
    /// project-parameter kinds), the input to the idempotency check.
    fn parameter_elements(&self) -> Vec<Element>;

    /// Read the current binding for a definition, if any. The binding map is
    /// authoritative; writers must read it first so categories bound by
    /// unrelated earlier operations survive a rebind.
    fn current_binding(&self, definition: &DefinitionId) -> Option<BoundParameter>;

    /// Attempt a fresh insertion. The host may refuse when the definition is
    /// already bound, or was ever bound and later removed in this document's
    /// history.
    fn insert_binding(&mut self, definition: &Definition, binding: &BoundParameter) -> bool;

    /// Update/merge form of the binding-map write, used as the one bounded
    /// fallback after a refused insert.
    fn reinsert_binding(&mut self, definition: &Definition, binding: &BoundParameter) -> bool;

    /// Open the externally managed edit scope. All binding-map mutation
    /// happens inside one scope per invocation.
    fn begin_edit(&mut self, label: &str) -> Result<(), HostFailure>;

    /// Keep the mutations made since `begin_edit`.
    fn commit_edit(&mut self) -> Result<(), HostFailure>;

    /// Discard the mutations made since `begin_edit`. Store-file contents
    /// are outside the scope and are not restored.
    fn cancel_edit(&mut self) -> Result<(), HostFailure>;
}
