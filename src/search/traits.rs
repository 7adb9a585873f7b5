use crate::search::types::{SearchQuery, SearchResultSet};
use anyhow::Result;
use async_trait::async_trait;

/// Anything that can answer a vehicle search.
/// The orchestrator only sees this trait, so tests can swap in canned or slow backends.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one search for the full query
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet>;

    /// Get the name of the backend
    fn source_name(&self) -> &'static str;
}
