//! Binding construction and insertion.
//!
//! A binding associates one definition with a set of categories and a scope
//! kind. The insertion path is an explicit state machine —
//! `NotBound → InsertAttempted → {Bound, ReinsertAttempted → {Bound,
//! Failed}}` — so the reinsert fallback is a visible transition rather than
//! an implicit retry, and each transition can be exercised on its own.

use crate::document::{BoundParameter, CategoryKey, DocumentModel};
use crate::store::Definition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Scope kind of a binding: per-occurrence values or per-type values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Instance,
    Type,
}

impl BindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Instance => "instance",
            BindingKind::Type => "type",
        }
    }
}

impl TryFrom<&str> for BindingKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "instance" => Ok(BindingKind::Instance),
            "type" => Ok(BindingKind::Type),
            other => anyhow::bail!("unknown binding kind: {other}"),
        }
    }
}

/// Deduplicated set of category keys targeted by one binding operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(BTreeSet<CategoryKey>);

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the key was already present.
    pub fn insert(&mut self, key: CategoryKey) -> bool {
        self.0.insert(key)
    }

    pub fn contains(&self, key: &CategoryKey) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates keys in stable order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryKey> {
        self.0.iter()
    }
}

impl FromIterator<CategoryKey> for CategorySet {
    fn from_iter<I: IntoIterator<Item = CategoryKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Per-run category accumulator.
///
/// The surrounding workflow issues one creation call per category; the
/// accumulator carries every category seen so far in the run so each call
/// rebinds the union instead of dropping previously bound categories when
/// the binding object is rebuilt. One accumulator per logical run, threaded
/// through the calls explicitly.
#[derive(Debug, Default)]
pub struct CategoryAccumulator {
    seen: BTreeSet<CategoryKey>,
}

impl CategoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category. Idempotent: returns false when already tracked.
    pub fn add(&mut self, key: &CategoryKey) -> bool {
        self.seen.insert(key.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Build a fresh set containing every category added in this run.
    pub fn materialize(&self) -> CategorySet {
        self.seen.iter().cloned().collect()
    }
}

/// States of the insertion machine. `Bound` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindState {
    NotBound,
    InsertAttempted,
    ReinsertAttempted,
    Bound,
    Failed,
}

/// Outcome of one `bind_definition` call. `trace` records the traversed
/// states in order, ending in the terminal.
#[derive(Debug, Clone, Serialize)]
pub struct BindReport {
    pub state: BindState,
    pub trace: Vec<BindState>,
    /// True when the document already had a binding for this definition and
    /// its categories were merged into the requested set.
    pub merged_existing: bool,
    /// The categories actually written, post-merge.
    pub categories: CategorySet,
}

/// Build a binding of the requested kind over `categories` and write it into
/// the document's binding map.
///
/// The document's current binding for the definition is read first and its
/// categories merged in, so a rebind never loses categories bound by earlier
/// unrelated operations. Insertion is attempted once; a refused insert falls
/// back to exactly one reinsert. Must run inside the caller's edit scope.
pub fn bind_definition(
    doc: &mut dyn DocumentModel,
    definition: &Definition,
    categories: CategorySet,
    kind: BindingKind,
) -> BindReport {
    let mut categories = categories;
    let mut merged_existing = false;

    if let Some(existing) = doc.current_binding(&definition.id) {
        merged_existing = true;
        if existing.kind != kind {
            warn!(
                definition = definition.name.as_str(),
                bound = existing.kind.as_str(),
                requested = kind.as_str(),
                "binding kind differs from the live binding; host may refuse the write"
            );
        }
        for key in existing.categories.iter() {
            categories.insert(key.clone());
        }
    }

    let binding = BoundParameter {
        kind,
        categories: categories.clone(),
    };

    let mut trace = vec![BindState::NotBound, BindState::InsertAttempted];
    let state = if doc.insert_binding(definition, &binding) {
        BindState::Bound
    } else {
        trace.push(BindState::ReinsertAttempted);
        if doc.reinsert_binding(definition, &binding) {
            BindState::Bound
        } else {
            BindState::Failed
        }
    };
    trace.push(state);

    match state {
        BindState::Bound => debug!(
            definition = definition.name.as_str(),
            kind = kind.as_str(),
            categories = categories.len(),
            via_reinsert = trace.contains(&BindState::ReinsertAttempted),
            "bound definition"
        ),
        _ => warn!(
            definition = definition.name.as_str(),
            kind = kind.as_str(),
            "insert and reinsert both refused"
        ),
    }

    BindReport {
        state,
        trace,
        merged_existing,
        categories,
    }
}
