pub mod catalog;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod propagation;
pub mod protocol;
pub mod scorer;
pub mod server;
pub mod stratify;
pub mod transport;
pub mod types;
pub mod vocabulary;

#[cfg(test)]
mod test_support;

pub use engine::RankEngine;
pub use error::RankError;
pub use types::{CourseRow, FacetFilters, RankRequest, Table};
