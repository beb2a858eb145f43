//! fixture-gen library
//!
//! Command implementations behind the `fixture-gen` binary: loading a type
//! catalog and a parameters file, then populating, resolving or validating
//! types with [`fixture_generator::ObjectGenerator`].
//!
//! # CLI Usage
//!
//! ```bash
//! # Ten orders as JSON lines
//! fixture-gen generate --catalog catalog.yaml --type Order --count 10 --seed 42
//!
//! # Parameters and producers from a file, written to disk
//! fixture-gen generate -c catalog.yaml -t 'Page<Customer>' --config params.yaml -o out.jsonl
//!
//! # How the fields of a generic subtype resolve
//! fixture-gen resolve --catalog catalog.yaml --type Sub
//!
//! # Check the catalog, the parameters and every concrete type
//! fixture-gen validate --catalog catalog.yaml --config params.yaml
//! ```

pub mod args;
pub mod config;
pub mod output;

use anyhow::Context;
use args::{GenerateArgs, ResolveArgs, ValidateArgs};
use config::FileConfig;
use fixture_core::{Resolver, TypeCatalog, TypeDescriptor, TypeKind};
use fixture_generator::{ObjectGenerator, Parameters};
use output::OutputMetrics;
use std::path::Path;
use tracing::info;

fn load_catalog(path: &Path) -> anyhow::Result<TypeCatalog> {
    TypeCatalog::from_file(path).with_context(|| format!("Failed to load catalog from {path:?}"))
}

fn build_generator(catalog: TypeCatalog, config: &FileConfig) -> anyhow::Result<ObjectGenerator> {
    let mut generator = ObjectGenerator::new(catalog, config.parameters.clone())
        .context("Invalid generation parameters")?;
    generator
        .register_bindings(&config.producers)
        .context("Invalid producer configuration")?;
    Ok(generator)
}

/// Run the `generate` command.
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<OutputMetrics> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let mut config = FileConfig::load(args.config.as_deref())?;
    config.apply_overrides(args);

    let generator = build_generator(catalog, &config)?;
    let desc = generator
        .resolve_type(&args.type_name)
        .with_context(|| format!("Cannot generate '{}'", args.type_name))?;

    info!(
        "Generating {} objects of '{}' (seed={})",
        args.count,
        desc,
        generator.parameters().seed
    );

    match &args.output {
        Some(path) => output::write_objects_to_file(
            &generator,
            &desc,
            args.start_index,
            args.count,
            args.pretty,
            path,
        ),
        None => output::write_objects(
            &generator,
            &desc,
            args.start_index,
            args.count,
            args.pretty,
            std::io::stdout().lock(),
        ),
    }
}

/// Run the `resolve` command, returning the description to print.
pub fn run_resolve(args: &ResolveArgs) -> anyhow::Result<String> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let generator = ObjectGenerator::new(catalog, Parameters::default())?;
    let desc = generator
        .resolve_type(&args.type_name)
        .with_context(|| format!("Cannot resolve '{}'", args.type_name))?;
    Ok(describe_type(generator.resolver(), &desc))
}

/// Describe a resolved type: its supertypes and its fields with their
/// resolved types.
///
/// ```text
/// Sub
///   extends Intermediate<list<string>>
///   extends Parent<list<string>>
///   id: list<string> (Parent)
/// ```
pub fn describe_type(resolver: &Resolver, desc: &TypeDescriptor) -> String {
    let mut out = format!("{desc}\n");

    let mut current = desc.clone();
    loop {
        let supertypes = resolver.direct_supertypes(&current);
        for interface in &supertypes.interfaces {
            out.push_str(&format!("  implements {interface}\n"));
        }
        match &supertypes.superclass {
            Some(superclass) => {
                out.push_str(&format!("  extends {superclass}\n"));
                current = superclass.clone();
            }
            None => break,
        }
    }

    for field in resolver.fields_of(desc).iter() {
        out.push_str(&format!(
            "  {}: {} ({})\n",
            field.name, field.field_type, field.declaring_type
        ));
    }
    out
}

/// Summary of a `validate` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Types in the catalog
    pub types: usize,
    /// Producer bindings in the parameters file
    pub producers: usize,
    /// Non-generic classes populated successfully
    pub populated: usize,
}

/// Run the `validate` command.
///
/// Besides loading the catalog and the parameters, populates one object of
/// every non-generic class so that missing constructors and unresolved types
/// surface before a real run.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<ValidationSummary> {
    let catalog = load_catalog(&args.catalog.catalog)?;
    let config = FileConfig::load(args.config.as_deref())?;
    let generator = build_generator(catalog, &config)?;

    let mut populated = 0;
    for def in &generator.catalog().types {
        if def.kind != TypeKind::Class || !def.params.is_empty() {
            continue;
        }
        generator
            .next_object(&def.name)
            .with_context(|| format!("Cannot populate '{}'", def.name))?;
        populated += 1;
    }

    Ok(ValidationSummary {
        types: generator.catalog().types.len(),
        producers: config.producers.len(),
        populated,
    })
}
