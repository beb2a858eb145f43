//! End-to-end tests of the command implementations.

use clap::Parser;
use fixture_gen::args::{CatalogArgs, Cli, Commands, GenerateArgs, ResolveArgs, ValidateArgs};
use fixture_gen::{run_generate, run_resolve, run_validate};
use std::path::PathBuf;
use tempfile::TempDir;

const CATALOG: &str = "tests/fixtures/catalog.yaml";
const PARAMS: &str = "tests/fixtures/params.yaml";

fn catalog_args() -> CatalogArgs {
    CatalogArgs {
        catalog: PathBuf::from(CATALOG),
    }
}

fn generate_args(type_name: &str, output: PathBuf) -> GenerateArgs {
    GenerateArgs {
        catalog: catalog_args(),
        type_name: type_name.to_string(),
        count: 5,
        start_index: 0,
        seed: None,
        max_depth: None,
        config: Some(PathBuf::from(PARAMS)),
        output: Some(output),
        pretty: false,
    }
}

fn read_lines(path: &PathBuf) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_generate_writes_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("orders.jsonl");

    let metrics = run_generate(&generate_args("Order", output.clone())).unwrap();
    assert_eq!(metrics.objects_written, 5);
    assert_eq!(metrics.bytes_written, std::fs::metadata(&output).unwrap().len());

    let orders = read_lines(&output);
    assert_eq!(orders.len(), 5);
    for (index, order) in orders.iter().enumerate() {
        assert_eq!(order["@type"], "Order");
        assert_eq!(order["status"], "NEW");
        assert_eq!(
            order["customer"]["email"],
            format!("customer_{index}@example.com")
        );
    }
}

#[test]
fn test_generate_start_index_and_seed_override() {
    let temp_dir = TempDir::new().unwrap();

    let full = temp_dir.path().join("full.jsonl");
    run_generate(&generate_args("Customer", full.clone())).unwrap();

    let tail = temp_dir.path().join("tail.jsonl");
    let mut args = generate_args("Customer", tail.clone());
    args.start_index = 3;
    args.count = 2;
    run_generate(&args).unwrap();
    assert_eq!(read_lines(&full)[3..], read_lines(&tail)[..]);

    let reseeded = temp_dir.path().join("reseeded.jsonl");
    let mut args = generate_args("Customer", reseeded.clone());
    args.seed = Some(7);
    run_generate(&args).unwrap();
    assert_ne!(read_lines(&full), read_lines(&reseeded));
}

#[test]
fn test_generate_unknown_type() {
    let temp_dir = TempDir::new().unwrap();
    let args = generate_args("Invoice", temp_dir.path().join("out.jsonl"));

    let err = run_generate(&args).unwrap_err();
    assert!(format!("{err:#}").contains("Invoice"));
}

#[test]
fn test_resolve_prints_fields() {
    let args = ResolveArgs {
        catalog: catalog_args(),
        type_name: "Page<Customer>".to_string(),
    };
    let description = run_resolve(&args).unwrap();

    let lines: Vec<&str> = description.lines().collect();
    assert_eq!(lines[0], "Page<Customer>");
    assert!(lines.contains(&"  items: list<Customer> (Page)"));
    assert!(lines.contains(&"  total: i64 (Page)"));
}

#[test]
fn test_validate_with_parameters() {
    let args = ValidateArgs {
        catalog: catalog_args(),
        config: Some(PathBuf::from(PARAMS)),
    };
    let summary = run_validate(&args).unwrap();

    assert_eq!(summary.types, 20);
    assert_eq!(summary.producers, 3);
    assert_eq!(summary.populated, 11);
}

#[test]
fn test_validate_reports_uninstantiable_elements() {
    let args = ValidateArgs {
        catalog: catalog_args(),
        config: None,
    };
    let err = run_validate(&args).unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("Cannot populate 'Drawing'"), "{message}");
    assert!(message.contains("Shape"), "{message}");
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bad.yaml");
    std::fs::write(
        &config,
        "collection_size_range:\n  min: 5\n  max: 1\n",
    )
    .unwrap();

    let args = ValidateArgs {
        catalog: catalog_args(),
        config: Some(config),
    };
    let err = run_validate(&args).unwrap_err();
    assert!(format!("{err:#}").contains("Invalid generation parameters"));
}

#[test]
fn test_cli_parsing() {
    let cli = Cli::try_parse_from([
        "fixture-gen",
        "generate",
        "--catalog",
        CATALOG,
        "--type",
        "Page<Customer>",
        "-n",
        "10",
        "--seed",
        "9",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate { args } => {
            assert_eq!(args.catalog.catalog, PathBuf::from(CATALOG));
            assert_eq!(args.type_name, "Page<Customer>");
            assert_eq!(args.count, 10);
            assert_eq!(args.start_index, 0);
            assert_eq!(args.seed, Some(9));
            assert!(args.output.is_none());
        }
        other => panic!("unexpected command {other:?}"),
    }
}
