// End-to-end workflow properties: idempotency, cross-call accumulation,
// visibility fixed at creation, failure containment, and the deliberate
// store/document rollback asymmetry.

#[path = "support/common.rs"]
mod common;

use common::{
    GROUP, element_with_parameter, sample_document, sample_request, store_line_count,
    store_location,
};
use parambind::{
    BindingKind, CategoryAccumulator, CategoryKey, DefinitionName, DocumentModel, Element,
    GroupName, StoreAccessor, ValueType, ensure_parameter, find_existing_parameter,
};

#[test]
fn fresh_run_creates_store_group_definition_and_binding() {
    let (_dir, path) = store_location();
    let mut doc = sample_document();
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();
    let request = sample_request("SP1", &["doors"]);

    doc.begin_edit("Check parameter SP1").expect("edit opens");
    let report =
        ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request).expect("ensure");
    doc.commit_edit().expect("commit");

    assert!(!report.already_present);
    assert!(report.all_bound);
    assert_eq!(report.bound, vec![CategoryKey::new("doors")]);
    assert!(report.skipped.is_empty());

    let definition = report.definition.expect("definition resolved");
    assert_eq!(definition.value_type, ValueType::Number);
    assert!(definition.visible);

    // The store landed on disk with the group and definition.
    let store = StoreAccessor::with_path(&path)
        .ensure_store()
        .expect("store reopens");
    let stored = store
        .group(&GroupName::new(GROUP))
        .and_then(|group| group.definition(&DefinitionName::new("SP1")))
        .expect("definition persisted");
    assert_eq!(stored.id, definition.id);

    // And the document carries an instance binding over doors.
    let bound = doc.current_binding(&definition.id).expect("binding present");
    assert_eq!(bound.kind, BindingKind::Instance);
    assert!(bound.categories.contains(&CategoryKey::new("doors")));
}

#[test]
fn present_parameter_short_circuits_with_zero_mutations() {
    let (_dir, path) = store_location();
    let mut doc = sample_document().with_element(element_with_parameter(901, "Fire Resistance"));
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();
    let request = sample_request("Fire Resistance", &["doors", "walls"]);

    doc.begin_edit("Check parameter Fire Resistance").expect("edit opens");
    let report =
        ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request).expect("ensure");
    doc.commit_edit().expect("commit");

    assert!(report.already_present);
    assert!(report.all_bound);
    assert!(report.bound.is_empty());
    assert!(report.definition.is_none());
    // No store file was created and no binding was written.
    assert!(!path.exists());
    assert_eq!(doc.binding_count(), 0);
}

#[test]
fn second_run_finds_the_parameter_and_mutates_nothing() {
    let (_dir, path) = store_location();
    let mut doc = sample_document();
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();
    let request = sample_request("SP1", &["doors", "walls"]);

    doc.begin_edit("first run").expect("edit opens");
    let first =
        ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request).expect("ensure");
    doc.commit_edit().expect("commit");
    assert!(!first.already_present);
    let lines = store_line_count(&path);
    let bindings = doc.binding_count();

    // The bound parameter is now discoverable, so the rerun is a no-op.
    let mut second_accumulator = CategoryAccumulator::new();
    doc.begin_edit("second run").expect("edit opens");
    let second = ensure_parameter(&mut doc, &mut accessor, &mut second_accumulator, &request)
        .expect("ensure again");
    doc.commit_edit().expect("commit");

    assert!(second.already_present);
    assert!(second.all_bound);
    assert_eq!(store_line_count(&path), lines);
    assert_eq!(doc.binding_count(), bindings);
}

#[test]
fn batch_accumulates_across_single_category_calls() {
    let (_dir, path) = store_location();
    let mut doc = sample_document();
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();
    // One creation call per category; the binding rebuilt on the last call
    // must cover the union, not windows alone.
    let request = sample_request("SP1", &["doors", "walls", "windows"]);

    doc.begin_edit("batch").expect("edit opens");
    let report =
        ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request).expect("ensure");
    doc.commit_edit().expect("commit");

    assert!(report.all_bound);
    let definition = report.definition.expect("definition resolved");
    let bound = doc.current_binding(&definition.id).expect("binding present");
    assert_eq!(bound.categories.len(), 3);
    for key in ["doors", "walls", "windows"] {
        assert!(bound.categories.contains(&CategoryKey::new(key)), "missing {key}");
    }
}

#[test]
fn accumulator_spans_invocations_within_a_run() {
    let (_dir, path) = store_location();
    let mut doc = sample_document();
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();

    doc.begin_edit("run").expect("edit opens");
    ensure_parameter(
        &mut doc,
        &mut accessor,
        &mut accumulator,
        &sample_request("SP1", &["doors"]),
    )
    .expect("first invocation");

    // A later invocation in the same run (different parameter, same
    // accumulator) re-applies every category seen so far.
    let report = ensure_parameter(
        &mut doc,
        &mut accessor,
        &mut accumulator,
        &sample_request("SP2", &["walls"]),
    )
    .expect("second invocation");
    doc.commit_edit().expect("commit");

    let definition = report.definition.expect("definition resolved");
    let bound = doc.current_binding(&definition.id).expect("binding present");
    assert!(bound.categories.contains(&CategoryKey::new("doors")));
    assert!(bound.categories.contains(&CategoryKey::new("walls")));
}

#[test]
fn visibility_is_fixed_by_the_first_resolved_category() {
    let (_dir, path) = store_location();
    let mut doc = sample_document();
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();
    // model_groups disallows visible bound parameters and comes first.
    let request = sample_request("SP1", &["model_groups", "doors"]);

    doc.begin_edit("visibility").expect("edit opens");
    let report =
        ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request).expect("ensure");
    doc.commit_edit().expect("commit");

    let definition = report.definition.expect("definition resolved");
    assert!(!definition.visible);

    // Later binding to a visibility-friendly category does not revisit the
    // flag, on disk or in memory.
    let store = StoreAccessor::with_path(&path)
        .ensure_store()
        .expect("store reopens");
    let stored = store
        .group(&GroupName::new(GROUP))
        .and_then(|group| group.definition(&DefinitionName::new("SP1")))
        .expect("definition persisted");
    assert!(!stored.visible);
}

#[test]
fn unresolvable_categories_are_contained() {
    let (_dir, path) = store_location();
    let mut doc = sample_document().with_category_fault("floors");
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();
    let request = sample_request("SP1", &["doors", "chimneys", "floors", "walls"]);

    doc.begin_edit("containment").expect("edit opens");
    let report =
        ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request).expect("ensure");
    doc.commit_edit().expect("commit");

    // The aggregate reports failure, but earlier and later successes stand.
    assert!(!report.all_bound);
    assert_eq!(
        report.bound,
        vec![CategoryKey::new("doors"), CategoryKey::new("walls")]
    );
    assert_eq!(report.skipped.len(), 2);
    let absent = &report.skipped[0];
    assert_eq!(absent.key, CategoryKey::new("chimneys"));
    assert!(absent.reason.contains("not defined"));
    let faulted = &report.skipped[1];
    assert_eq!(faulted.key, CategoryKey::new("floors"));
    assert!(faulted.reason.contains("lookup failed"));

    let definition = report.definition.expect("definition resolved");
    let bound = doc.current_binding(&definition.id).expect("binding present");
    assert!(bound.categories.contains(&CategoryKey::new("doors")));
    assert!(bound.categories.contains(&CategoryKey::new("walls")));
    assert!(!bound.categories.contains(&CategoryKey::new("chimneys")));
}

#[test]
fn rollback_restores_the_document_but_not_the_store() {
    let (_dir, path) = store_location();
    let mut doc = sample_document();
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();
    let request = sample_request("SP1", &["doors"]);

    doc.begin_edit("doomed run").expect("edit opens");
    let report =
        ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request).expect("ensure");
    let first_id = report.definition.expect("definition resolved").id;
    doc.cancel_edit().expect("rollback");

    // Document state is back to pristine; the store keeps its records.
    assert_eq!(doc.binding_count(), 0);
    assert!(doc.parameter_elements().is_empty());
    assert!(store_line_count(&path) > 0);

    // A retried run reuses the orphaned store entries instead of recreating
    // them.
    let mut retry_accumulator = CategoryAccumulator::new();
    doc.begin_edit("retry").expect("edit opens");
    let retry = ensure_parameter(&mut doc, &mut accessor, &mut retry_accumulator, &request)
        .expect("retry ensures");
    doc.commit_edit().expect("commit");

    assert_eq!(retry.definition.expect("definition resolved").id, first_id);
    assert_eq!(doc.binding_count(), 1);
}

#[test]
fn empty_batch_is_vacuously_successful() {
    let (_dir, path) = store_location();
    let mut doc = sample_document();
    let mut accessor = StoreAccessor::with_path(&path);
    let mut accumulator = CategoryAccumulator::new();
    let request = sample_request("SP1", &[]);

    doc.begin_edit("empty").expect("edit opens");
    let report =
        ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request).expect("ensure");
    doc.commit_edit().expect("commit");

    assert!(report.all_bound);
    assert!(report.bound.is_empty());
    assert!(report.definition.is_none());
    assert_eq!(doc.binding_count(), 0);
    // The group is still ensured before the per-category loop runs.
    let store = StoreAccessor::with_path(&path)
        .ensure_store()
        .expect("store reopens");
    assert!(store.group(&GroupName::new(GROUP)).is_some());
}

#[test]
fn existing_parameter_scan_short_circuits_and_matches_exactly() {
    let elements = vec![
        element_with_parameter(1, "Fire Resistance"),
        element_with_parameter(2, "Acoustic Rating"),
    ];
    assert!(find_existing_parameter(elements.iter(), "Acoustic Rating"));
    assert!(!find_existing_parameter(elements.iter(), "acoustic rating"));
    assert!(!find_existing_parameter(elements.iter(), "Thermal Mass"));
    let none: Vec<Element> = Vec::new();
    assert!(!find_existing_parameter(none.iter(), "Fire Resistance"));
}
