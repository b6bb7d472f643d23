//! Thin caller around the ensure workflow.
//!
//! Loads a JSON document fixture, opens an edit scope, runs the workflow
//! for one parameter over a category list, and prints the summary report as
//! one JSON object. The scope commits on success and rolls back on failure;
//! appended store records survive a rollback by design.

use anyhow::{Context, Result, bail};
use clap::Parser;
use parambind::{
    BindingKind, CategoryAccumulator, CategoryKey, DefinitionName, DocumentModel, EnsureRequest,
    GroupName, MemoryDocument, StoreAccessor, ValueType, ensure_parameter, split_list,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "parambind",
    about = "Ensure a shared parameter exists in the store and is bound to document categories."
)]
struct Cli {
    /// JSON document fixture to operate on.
    #[arg(long)]
    document: PathBuf,

    /// Store path. Overrides PARAMBIND_SHARED_STORE and the default
    /// shared_params.jsonl.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Parameter name to ensure.
    #[arg(long)]
    name: String,

    /// Definition group in the store.
    #[arg(long, default_value = "Coursework Parameters")]
    group: String,

    /// Declared value type for a newly created definition.
    #[arg(long, default_value = "number")]
    value_type: String,

    /// Binding scope kind: instance or type.
    #[arg(long, default_value = "instance")]
    kind: String,

    /// Comma- or space-separated category keys.
    #[arg(long)]
    categories: String,

    /// Write the mutated document back to --document on success.
    #[arg(long)]
    write: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let kind = BindingKind::try_from(cli.kind.as_str())?;
    let value_type = ValueType::try_from(cli.value_type.as_str())?;
    let categories: Vec<CategoryKey> = split_list(&cli.categories)
        .into_iter()
        .map(CategoryKey)
        .collect();
    if categories.is_empty() {
        bail!("no categories given");
    }

    let mut doc = MemoryDocument::load(&cli.document)?;
    let mut accessor = match cli.store {
        Some(path) => StoreAccessor::with_path(path),
        None => StoreAccessor::new(),
    };
    let mut accumulator = CategoryAccumulator::new();
    let request = EnsureRequest {
        name: DefinitionName::new(cli.name.as_str()),
        group: GroupName::new(cli.group.as_str()),
        value_type,
        kind,
        categories,
    };

    doc.begin_edit(&format!("Check parameter {}", cli.name))?;
    match ensure_parameter(&mut doc, &mut accessor, &mut accumulator, &request) {
        Ok(report) => {
            doc.commit_edit()?;
            if cli.write {
                doc.save(&cli.document)?;
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(err) => {
            if let Err(cancel) = doc.cancel_edit() {
                eprintln!("rollback failed: {cancel}");
            }
            Err(err).context("ensure workflow failed")
        }
    }
}
