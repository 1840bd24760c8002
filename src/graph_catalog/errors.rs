//! Error types for loading and validating the schema catalogue.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphCatalogError {
    #[error("Failed to read catalogue file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse catalogue: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid catalogue: {message}")]
    InvalidConfig { message: String },
}
