use std::time::Duration;

pub mod config;
pub mod geo;
pub mod matcher;
pub mod repository;
pub mod search;
pub mod viability;

pub use config::MatchingConfig;
pub use matcher::RouteMatcher;
pub use repository::{EmptyLegRepository, MemoryLegRepository};
pub use search::EmptyLegSearch;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Listing retrieval failed: {0}")]
    RetrievalFailed(String),
    #[error("Listing retrieval timed out after {0:?}")]
    RetrievalTimeout(Duration),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
pub(crate) mod test_support;
