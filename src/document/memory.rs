//! In-memory reference host.
//!
//! `MemoryDocument` implements `DocumentModel` for the CLI and the test
//! suite. It is serde-loadable so a document can be described as a JSON
//! fixture. Binding-map rules mirror the host quirks the workflow has to
//! survive: a refused insert for ever-bound-then-removed definitions, and a
//! reinsert that refuses to change the scope kind of a live binding. A
//! successful write also materializes a shared-parameter element, so the
//! parameter is immediately discoverable by the idempotency scan.

use crate::document::{BoundParameter, Category, CategoryKey, DocumentModel, Element, ElementKind};
use crate::error::HostFailure;
use crate::store::{Definition, DefinitionId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    categories: BTreeMap<CategoryKey, Category>,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    bindings: BTreeMap<DefinitionId, BoundParameter>,
    /// Definitions that were bound once and later removed. Inserts against
    /// these are refused; only reinsert revives them.
    #[serde(default)]
    retired: BTreeSet<DefinitionId>,
    /// Fault injection: lookups for these keys fail at the host level
    /// instead of reporting absence.
    #[serde(default)]
    category_faults: BTreeSet<CategoryKey>,
    #[serde(skip)]
    edit: Option<EditScope>,
}

#[derive(Debug)]
struct EditScope {
    label: String,
    bindings: BTreeMap<DefinitionId, BoundParameter>,
    retired: BTreeSet<DefinitionId>,
    elements: Vec<Element>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document fixture from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading document {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing document {}", path.display()))
    }

    /// Write the document back to disk as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("serializing document")?;
        fs::write(path, data).with_context(|| format!("writing document {}", path.display()))
    }

    pub fn with_category(mut self, key: &str, name: &str, allows_bound_parameters: bool) -> Self {
        self.insert_category(Category {
            key: CategoryKey::new(key),
            name: name.to_string(),
            allows_bound_parameters,
        });
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.push_element(element);
        self
    }

    pub fn with_category_fault(mut self, key: &str) -> Self {
        self.category_faults.insert(CategoryKey::new(key));
        self
    }

    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.key.clone(), category);
    }

    pub fn push_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Number of entries currently in the binding map.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Remove a live binding, leaving the tombstone that makes later inserts
    /// fail. Returns the removed entry.
    pub fn remove_binding(&mut self, definition: &DefinitionId) -> Option<BoundParameter> {
        let removed = self.bindings.remove(definition);
        if removed.is_some() {
            self.retired.insert(*definition);
        }
        removed
    }

    fn require_open_edit(&self) -> Result<(), HostFailure> {
        if self.edit.is_none() {
            return Err(HostFailure::new("no edit scope is open"));
        }
        Ok(())
    }

    /// A bound parameter is immediately discoverable: surface it as a
    /// shared-parameter element unless one already exposes the name.
    fn materialize_parameter_element(&mut self, definition: &Definition) {
        let name = definition.name.as_str();
        let exposed = self.elements.iter().any(|element| {
            element.kind == ElementKind::SharedParameterElement
                && element.parameters.contains(name)
        });
        if exposed {
            return;
        }
        let id = self.elements.iter().map(|element| element.id).max().unwrap_or(0) + 1;
        self.elements.push(Element {
            id,
            kind: ElementKind::SharedParameterElement,
            parameters: BTreeSet::from([name.to_string()]),
        });
    }
}

impl DocumentModel for MemoryDocument {
    fn category(&self, key: &CategoryKey) -> Result<Option<Category>, HostFailure> {
        if self.category_faults.contains(key) {
            return Err(HostFailure::new(format!(
                "host failed to fetch category table entry '{key}'"
            )));
        }
        Ok(self.categories.get(key).cloned())
    }

    fn parameter_elements(&self) -> Vec<Element> {
        // Pre-filtered by construction; dedupe by element id, first wins.
        let mut seen = BTreeSet::new();
        self.elements
            .iter()
            .filter(|element| seen.insert(element.id))
            .cloned()
            .collect()
    }

    fn current_binding(&self, definition: &DefinitionId) -> Option<BoundParameter> {
        self.bindings.get(definition).cloned()
    }

    fn insert_binding(&mut self, definition: &Definition, binding: &BoundParameter) -> bool {
        if self.bindings.contains_key(&definition.id) || self.retired.contains(&definition.id) {
            return false;
        }
        self.bindings.insert(definition.id, binding.clone());
        self.materialize_parameter_element(definition);
        true
    }

    fn reinsert_binding(&mut self, definition: &Definition, binding: &BoundParameter) -> bool {
        if let Some(existing) = self.bindings.get(&definition.id) {
            // A live binding's scope kind is fixed; reinsert only replaces
            // the category set.
            if existing.kind != binding.kind {
                return false;
            }
        }
        self.retired.remove(&definition.id);
        self.bindings.insert(definition.id, binding.clone());
        self.materialize_parameter_element(definition);
        true
    }

    fn begin_edit(&mut self, label: &str) -> Result<(), HostFailure> {
        if let Some(open) = &self.edit {
            return Err(HostFailure::new(format!(
                "edit scope '{}' is already open",
                open.label
            )));
        }
        debug!(label, "opened edit scope");
        self.edit = Some(EditScope {
            label: label.to_string(),
            bindings: self.bindings.clone(),
            retired: self.retired.clone(),
            elements: self.elements.clone(),
        });
        Ok(())
    }

    fn commit_edit(&mut self) -> Result<(), HostFailure> {
        self.require_open_edit()?;
        self.edit = None;
        Ok(())
    }

    fn cancel_edit(&mut self) -> Result<(), HostFailure> {
        self.require_open_edit()?;
        if let Some(scope) = self.edit.take() {
            debug!(label = scope.label.as_str(), "rolled back edit scope");
            self.bindings = scope.bindings;
            self.retired = scope.retired;
            self.elements = scope.elements;
        }
        Ok(())
    }
}
