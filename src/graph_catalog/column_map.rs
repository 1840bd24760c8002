//! Column name to FROM-alias mapping used to qualify bare column references.

use std::collections::HashMap;

use super::config::SchemaCatalog;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnAliasMap {
    owners: HashMap<String, Vec<String>>,
}

impl ColumnAliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every catalogued column of each `(table, alias)` pair to the alias,
    /// in FROM order.
    pub fn build<'a>(
        tables: impl IntoIterator<Item = (&'a str, &'a str)>,
        catalog: &dyn SchemaCatalog,
    ) -> Self {
        let mut map = Self::new();
        for (table, alias) in tables {
            if let Some(columns) = catalog.columns(table) {
                for column in columns {
                    map.insert(column, alias);
                }
            }
        }
        map
    }

    pub fn insert(&mut self, column: &str, alias: &str) {
        let owners = self.owners.entry(column.to_lowercase()).or_default();
        if !owners.iter().any(|a| a.eq_ignore_ascii_case(alias)) {
            owners.push(alias.to_string());
        }
    }

    /// Aliases whose table declares `column`.
    pub fn owners(&self, column: &str) -> &[String] {
        self.owners
            .get(&column.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
