//! Error kinds for the store and binding workflow.
//!
//! Resolver-level failures abort the remaining steps of the current
//! invocation; only `CategoryUnavailable` is contained by the batch loop in
//! `workflow`. None of these are fatal to the process — the caller owns the
//! surrounding edit scope and decides whether to roll it back.

use crate::document::CategoryKey;
use std::path::PathBuf;

/// A failure reported by the host document model while servicing an opaque
/// capability (category lookup, element enumeration, edit scope).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HostFailure(pub String);

impl HostFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The definition store could not be opened or parsed at the active path.
    /// There is no partial-success state: the whole workflow aborts.
    #[error("definition store unavailable at {path}: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },

    /// The named group was absent and the store rejected its creation.
    #[error("unable to create definition group '{name}': {reason}")]
    GroupCreationFailed { name: String, reason: String },

    /// The named definition was absent and the store rejected its creation.
    #[error("unable to create definition '{name}' in group '{group}': {reason}")]
    DefinitionCreationFailed {
        group: String,
        name: String,
        reason: String,
    },

    /// Both the insert and the reinsert form of the binding-map write were
    /// refused by the host. No further retry is attempted.
    #[error("unable to bind definition '{name}': insert and reinsert both refused")]
    BindingFailed { name: String },

    /// A requested category could not be resolved in the document. In a
    /// batch this skips the category rather than aborting the batch.
    #[error("category '{key}' not available in document: {reason}")]
    CategoryUnavailable { key: CategoryKey, reason: String },
}

impl BindError {
    pub(crate) fn store_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn group_creation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GroupCreationFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn definition_creation(
        group: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DefinitionCreationFailed {
            group: group.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }
}
