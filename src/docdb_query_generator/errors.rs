use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryGeneratorError {
    #[error("Node `{0}` not found in pattern graph (segments can only be generated for MATCH or FROM aliases)")]
    NodeNotFound(String),
    #[error("Component {0} does not exist in pattern graph")]
    ComponentNotFound(usize),
}
