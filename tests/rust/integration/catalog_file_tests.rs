//! Compilation driven by catalogue and configuration files on disk.

use std::io::Write;

use docgraph::compile_query;
use docgraph::config::{CompilerConfig, ComponentMode};
use docgraph::graph_catalog::{CatalogConfig, SchemaCatalog};
use docgraph::query_planner::{BindingError, QueryPlannerError};
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const CATALOG_YAML: &str = r#"
tables:
  Person:
    columns: [name, age]
    edges: [knows]
  City:
    columns: [population]
    edges: [road]
"#;

#[test]
fn test_bare_columns_resolve_through_catalogue_file() -> anyhow::Result<()> {
    let file = write_temp(CATALOG_YAML);
    let catalog = CatalogConfig::from_yaml_file(file.path())?;
    assert!(catalog.has_edge_column("Person", "knows"));

    let compiled = compile_query(
        "SELECT name FROM Person p, City c WHERE age > 30 AND population > 1000",
        &catalog,
        &CompilerConfig::default(),
    )?;
    let plan = compiled.main_plan().unwrap();

    assert_eq!(plan.header.result_columns(), ["p.name"]);
    assert!(plan.segments[0]
        .1
        .ends_with("p.name AS p_name FROM p WHERE p.age > 30"));
    assert!(plan.segments[1].1.ends_with("FROM c WHERE c.population > 1000"));
    Ok(())
}

#[test]
fn test_unresolved_bare_column_is_reported() {
    let file = write_temp(CATALOG_YAML);
    let catalog = CatalogConfig::from_yaml_file(file.path()).unwrap();

    let err = compile_query(
        "SELECT * FROM Person p WHERE salary > 10",
        &catalog,
        &CompilerConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        QueryPlannerError::Binding(BindingError::UnresolvedColumn("salary".to_string()))
    );
}

#[test]
fn test_config_file_drives_compile() -> anyhow::Result<()> {
    let catalog_file = write_temp(CATALOG_YAML);
    let config_file = write_temp(
        "input_batch_size: 5\noutput_batch_size: 7\ncomponent_mode: connected\nstrict_from: true\n",
    );

    let catalog = CatalogConfig::from_yaml_file(catalog_file.path())?;
    let config = CompilerConfig::from_yaml_file(config_file.path())?;
    assert_eq!(config.component_mode, ComponentMode::Connected);

    let compiled = compile_query(
        "SELECT * FROM Person p, Person q, City c MATCH p-[knows]->q",
        &catalog,
        &config,
    )?;
    assert_eq!(compiled.plans.len(), 2);
    let root = &compiled.plans[0].root;
    assert_eq!((root.input_batch_size, root.output_batch_size), (5, 7));

    // strict_from rejects the undeclared `x`
    assert!(compile_query("SELECT * FROM Person p MATCH p-[knows]->x", &catalog, &config).is_err());
    Ok(())
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let config_file = write_temp("input_batch_size: 0\n");
    assert!(CompilerConfig::from_yaml_file(config_file.path()).is_err());
}
