//! External definition store.
//!
//! A store is a file-backed, append-only container of named groups, each
//! holding named, typed definitions. One store file is shared across
//! documents; opening never destroys existing contents, and both groups and
//! definitions follow strict find-or-create semantics. Callers obtain a
//! parsed `DefinitionFile` through `StoreAccessor` and never touch the file
//! directly.

pub mod accessor;
pub mod file;
pub mod identity;
pub mod model;

pub use accessor::StoreAccessor;
pub use file::{DefinitionFile, DefinitionGroup};
pub use identity::{DefinitionId, DefinitionName, GroupName, ValueType};
pub use model::{Definition, STORE_SCHEMA_VERSION};
