//! Parsed, indexed view of one definition store file.
//!
//! The index is strict about duplicates and dangling references so a
//! corrupted or hand-edited store cannot be silently consumed. Creation
//! operations follow find-or-create semantics: lookups win, and an existing
//! definition is returned unchanged even when the caller's requested shape
//! differs.

use crate::error::BindError;
use crate::store::identity::{DefinitionId, DefinitionName, GroupName, ValueType, validate_store_name};
use crate::store::model::{self, Definition, GroupRecord, StoreRecord};
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Named collection of definitions within a store. Never deleted by this
/// subsystem.
#[derive(Debug)]
pub struct DefinitionGroup {
    name: GroupName,
    definitions: BTreeMap<DefinitionName, Definition>,
}

impl DefinitionGroup {
    fn new(name: GroupName) -> Self {
        Self {
            name,
            definitions: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &GroupName {
        &self.name
    }

    /// Exact, case-sensitive lookup.
    pub fn definition(&self, name: &DefinitionName) -> Option<&Definition> {
        self.definitions.get(name)
    }

    /// Iterates definitions in stable name order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }
}

/// One opened store file plus a derived index keyed by group name.
#[derive(Debug)]
pub struct DefinitionFile {
    path: PathBuf,
    groups: BTreeMap<GroupName, DefinitionGroup>,
}

impl DefinitionFile {
    /// Parse and index the store at `path`. Opening is side-effect-free on
    /// existing contents; any structural problem maps to `StoreUnavailable`.
    pub fn open(path: &Path) -> Result<Self, BindError> {
        let records = model::read_records(path)
            .map_err(|err| BindError::store_unavailable(path, format!("{err:#}")))?;
        let groups = build_index(records)
            .map_err(|err| BindError::store_unavailable(path, format!("{err:#}")))?;
        Ok(Self {
            path: path.to_path_buf(),
            groups,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn group(&self, name: &GroupName) -> Option<&DefinitionGroup> {
        self.groups.get(name)
    }

    /// Iterates groups in stable name order.
    pub fn groups(&self) -> impl Iterator<Item = &DefinitionGroup> {
        self.groups.values()
    }

    /// Find the named group, creating and persisting it when absent.
    pub fn ensure_group(&mut self, name: &GroupName) -> Result<&DefinitionGroup, BindError> {
        match self.groups.entry(name.clone()) {
            Entry::Occupied(existing) => Ok(existing.into_mut()),
            Entry::Vacant(slot) => {
                validate_store_name("group", name.as_str())
                    .map_err(|err| BindError::group_creation(name.as_str(), format!("{err:#}")))?;
                let record = StoreRecord::Group(GroupRecord { name: name.clone() });
                model::append_record(&self.path, &record)
                    .map_err(|err| BindError::group_creation(name.as_str(), format!("{err:#}")))?;
                debug!(group = name.as_str(), "created definition group");
                Ok(slot.insert(DefinitionGroup::new(name.clone())))
            }
        }
    }

    /// Find the named definition within `group`, creating and persisting it
    /// when absent. An existing definition is returned as stored: the
    /// requested value type and visibility are ignored, never retrofitted.
    pub fn ensure_definition(
        &mut self,
        group: &GroupName,
        name: &DefinitionName,
        value_type: ValueType,
        visible: bool,
    ) -> Result<Definition, BindError> {
        let Some(slot) = self.groups.get_mut(group) else {
            return Err(BindError::definition_creation(
                group.as_str(),
                name.as_str(),
                "group not present in store",
            ));
        };

        if let Some(existing) = slot.definitions.get(name) {
            return Ok(existing.clone());
        }

        validate_store_name("definition", name.as_str()).map_err(|err| {
            BindError::definition_creation(group.as_str(), name.as_str(), format!("{err:#}"))
        })?;

        let definition = Definition {
            group: group.clone(),
            name: name.clone(),
            id: DefinitionId::generate(),
            value_type,
            visible,
        };
        model::append_record(&self.path, &StoreRecord::Definition(definition.clone())).map_err(
            |err| {
                BindError::definition_creation(group.as_str(), name.as_str(), format!("{err:#}"))
            },
        )?;
        debug!(
            group = group.as_str(),
            definition = name.as_str(),
            id = %definition.id,
            visible,
            "created shared definition"
        );
        slot.definitions.insert(name.clone(), definition.clone());
        Ok(definition)
    }
}

fn build_index(records: Vec<StoreRecord>) -> Result<BTreeMap<GroupName, DefinitionGroup>> {
    let mut groups: BTreeMap<GroupName, DefinitionGroup> = BTreeMap::new();
    for record in records {
        match record {
            StoreRecord::Header(_) => bail!("header record leaked past the reader"),
            StoreRecord::Group(group) => {
                if groups.contains_key(&group.name) {
                    bail!("duplicate group record '{}'", group.name);
                }
                groups.insert(group.name.clone(), DefinitionGroup::new(group.name));
            }
            StoreRecord::Definition(definition) => {
                let Some(group) = groups.get_mut(&definition.group) else {
                    bail!(
                        "definition '{}' references undeclared group '{}'",
                        definition.name,
                        definition.group
                    );
                };
                if group.definitions.contains_key(&definition.name) {
                    bail!(
                        "duplicate definition '{}' in group '{}'",
                        definition.name,
                        definition.group
                    );
                }
                group
                    .definitions
                    .insert(definition.name.clone(), definition);
            }
        }
    }
    Ok(groups)
}
