//! YAML-backed schema catalogue.
//!
//! ```yaml
//! tables:
//!   Person:
//!     columns: [name, age, city]
//!     edges: [knows, works_at]
//! ```
//!
//! `columns` are scalar document properties; `edges` are properties holding
//! adjacency lists that MATCH edges may traverse.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use super::errors::GraphCatalogError;

/// Read-only schema lookups used while compiling a query.
///
/// Returning `None` means the table is unknown, in which case the compiler
/// skips the corresponding validation instead of failing.
pub trait SchemaCatalog {
    fn columns(&self, table: &str) -> Option<&[String]>;

    fn edge_columns(&self, table: &str) -> Option<&[String]>;

    fn has_column(&self, table: &str, column: &str) -> bool {
        self.columns(table)
            .is_some_and(|cols| cols.iter().any(|c| c.eq_ignore_ascii_case(column)))
    }

    fn has_edge_column(&self, table: &str, column: &str) -> bool {
        self.edge_columns(table)
            .is_some_and(|cols| cols.iter().any(|c| c.eq_ignore_ascii_case(column)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub edges: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub tables: BTreeMap<String, TableSchema>,
}

impl CatalogConfig {
    /// Load and validate a catalogue from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, GraphCatalogError> {
        let contents =
            fs::read_to_string(path).map_err(|e| GraphCatalogError::ConfigReadError {
                error: e.to_string(),
            })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a catalogue from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GraphCatalogError> {
        let config: CatalogConfig =
            serde_yaml::from_str(yaml).map_err(|e| GraphCatalogError::ConfigParseError {
                error: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GraphCatalogError> {
        for (table, schema) in &self.tables {
            let mut seen = HashSet::new();
            for name in schema.columns.iter().chain(schema.edges.iter()) {
                if name.trim().is_empty() {
                    return Err(GraphCatalogError::InvalidConfig {
                        message: format!("Table '{}' declares an empty column name", table),
                    });
                }
                if !seen.insert(name.to_lowercase()) {
                    return Err(GraphCatalogError::InvalidConfig {
                        message: format!("Table '{}' declares column '{}' twice", table, name),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn with_table(mut self, name: &str, columns: &[&str], edges: &[&str]) -> Self {
        self.tables.insert(
            name.to_string(),
            TableSchema {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                edges: edges.iter().map(|e| e.to_string()).collect(),
            },
        );
        self
    }

    fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name).or_else(|| {
            self.tables
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }
}

impl SchemaCatalog for CatalogConfig {
    fn columns(&self, table: &str) -> Option<&[String]> {
        self.table(table).map(|t| t.columns.as_slice())
    }

    fn edge_columns(&self, table: &str) -> Option<&[String]> {
        self.table(table).map(|t| t.edges.as_slice())
    }
}
