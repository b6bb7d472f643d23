//! Store accessor: active-path registration plus open-or-create.
//!
//! The host application constructs exactly one accessor, which carries the
//! "current shared parameter file" state that the workflow reads. Resolving
//! an unset path falls back to the `PARAMBIND_SHARED_STORE` environment
//! variable and then the fixed default filename, and the resolved path stays
//! registered for the accessor's lifetime so repeated invocations reuse one
//! store.

use crate::error::BindError;
use crate::store::file::DefinitionFile;
use crate::store::model;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default)]
pub struct StoreAccessor {
    active_path: Option<PathBuf>,
}

impl StoreAccessor {
    /// Accessor with no configured path; the first `ensure_store` call
    /// resolves and registers one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accessor pinned to an explicit path. Explicit configuration wins over
    /// the environment and the default filename.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            active_path: Some(path.into()),
        }
    }

    /// The currently registered store path, if any.
    pub fn active_path(&self) -> Option<&Path> {
        self.active_path.as_deref()
    }

    /// Open the active store, creating the file first when it does not
    /// exist. Creation appends, so existing contents are never truncated.
    /// Any failure to produce a parsed store maps to `StoreUnavailable` and
    /// the caller must abort the workflow.
    pub fn ensure_store(&mut self) -> Result<DefinitionFile, BindError> {
        let path = match &self.active_path {
            Some(path) => path.clone(),
            None => {
                let resolved = crate::default_store_path();
                debug!(path = %resolved.display(), "registered default store path");
                self.active_path = Some(resolved.clone());
                resolved
            }
        };

        model::touch_store(&path)
            .map_err(|err| BindError::store_unavailable(&path, format!("{err:#}")))?;
        DefinitionFile::open(&path)
    }
}
