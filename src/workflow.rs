//! End-to-end workflow: reach the state where a named parameter definition
//! exists exactly once in the shared store and is bound to the requested
//! categories.
//!
//! The idempotency check runs before any mutation; when the parameter is
//! already present and functioning the workflow reports success without
//! touching the store or the binding map. Category resolution failures are
//! contained per category; store, group, definition, and binding failures
//! abort the remaining batch. All binding-map mutation happens inside the
//! caller's edit scope, so the caller can discard document effects by
//! cancelling the scope — appended store records intentionally survive.

use crate::binding::{BindState, BindingKind, CategoryAccumulator, bind_definition};
use crate::document::{CategoryKey, DocumentModel, Element};
use crate::error::BindError;
use crate::store::{Definition, DefinitionFile, DefinitionName, GroupName, StoreAccessor, ValueType};
use serde::Serialize;
use tracing::{debug, info, warn};

/// One ensure invocation: bind `name` (declared in `group` with
/// `value_type`) to every listed category with the given scope kind.
#[derive(Debug, Clone)]
pub struct EnsureRequest {
    pub name: DefinitionName,
    pub group: GroupName,
    pub value_type: ValueType,
    pub kind: BindingKind,
    pub categories: Vec<CategoryKey>,
}

/// A category the batch skipped, with a human-readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedCategory {
    pub key: CategoryKey,
    pub reason: String,
}

/// Summary of one ensure invocation.
///
/// `all_bound` is the AND aggregate: true only when every requested category
/// resolved and bound (vacuously true for an empty batch). Earlier successes
/// stay visible in `bound` even when a later category fails.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnsureReport {
    pub already_present: bool,
    pub all_bound: bool,
    pub bound: Vec<CategoryKey>,
    pub skipped: Vec<SkippedCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Definition>,
}

/// Scan parameter-bearing elements for an exact parameter-name match.
///
/// Short-circuits on the first hit; purely read-only. Callers run this
/// before any store or binding mutation so a present-and-functioning
/// parameter never triggers redundant creation.
pub fn find_existing_parameter<'a>(
    elements: impl IntoIterator<Item = &'a Element>,
    name: &str,
) -> bool {
    elements
        .into_iter()
        .any(|element| element.parameters.contains(name))
}

/// Ensure the named parameter exists in the store and is bound to the
/// requested categories.
///
/// The accumulator is per logical run and owned by the caller: successive
/// invocations against the same accumulator converge on the union of every
/// category seen, never on the last category alone.
pub fn ensure_parameter(
    doc: &mut dyn DocumentModel,
    accessor: &mut StoreAccessor,
    accumulator: &mut CategoryAccumulator,
    request: &EnsureRequest,
) -> Result<EnsureReport, BindError> {
    let name = request.name.as_str();

    if find_existing_parameter(doc.parameter_elements().iter(), name) {
        info!(parameter = name, "parameter already present; nothing to do");
        return Ok(EnsureReport {
            already_present: true,
            all_bound: true,
            ..EnsureReport::default()
        });
    }
    debug!(parameter = name, "parameter not found; creating it");

    let mut store = accessor.ensure_store()?;
    store.ensure_group(&request.group)?;

    let mut report = EnsureReport::default();
    for key in &request.categories {
        match bind_one_category(doc, &mut store, accumulator, request, key) {
            Ok(definition) => {
                report.bound.push(key.clone());
                report.definition = Some(definition);
            }
            Err(BindError::CategoryUnavailable { key, reason }) => {
                warn!(category = key.as_str(), reason = reason.as_str(), "skipping category");
                report.skipped.push(SkippedCategory { key, reason });
            }
            Err(other) => return Err(other),
        }
    }

    report.all_bound = report.skipped.is_empty();
    info!(
        parameter = name,
        bound = report.bound.len(),
        skipped = report.skipped.len(),
        all_bound = report.all_bound,
        "ensure finished"
    );
    Ok(report)
}

/// One creation call: resolve the category, ensure the definition, grow the
/// accumulated set, and rebind over the union.
fn bind_one_category(
    doc: &mut dyn DocumentModel,
    store: &mut DefinitionFile,
    accumulator: &mut CategoryAccumulator,
    request: &EnsureRequest,
    key: &CategoryKey,
) -> Result<Definition, BindError> {
    let category = doc
        .category(key)
        .map_err(|fault| BindError::CategoryUnavailable {
            key: key.clone(),
            reason: format!("lookup failed: {fault}"),
        })?
        .ok_or_else(|| BindError::CategoryUnavailable {
            key: key.clone(),
            reason: "not defined in document".to_string(),
        })?;

    // Visibility derives from the first resolved category's capability; for
    // every later call the definition already exists and the requested flag
    // is ignored.
    let visible = category.allows_bound_parameters;
    let definition =
        store.ensure_definition(&request.group, &request.name, request.value_type, visible)?;

    accumulator.add(&category.key);
    let categories = accumulator.materialize();

    let outcome = bind_definition(doc, &definition, categories, request.kind);
    if outcome.state == BindState::Failed {
        return Err(BindError::BindingFailed {
            name: request.name.to_string(),
        });
    }
    Ok(definition)
}
