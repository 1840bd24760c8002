//! Text generation for the document store's native query dialect.

pub mod errors;
mod query_segment;

pub use errors::QueryGeneratorError;
pub use query_segment::{
    ends_with_dangling_where, generate_query_segment, synthesize_component_segments,
};
