pub mod column_map;
pub mod config;
pub mod errors;

pub use column_map::ColumnAliasMap;
pub use config::{CatalogConfig, SchemaCatalog, TableSchema};
pub use errors::GraphCatalogError;
