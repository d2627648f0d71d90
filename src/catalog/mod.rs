//! Remote character catalog access.
//!
//! - `CatalogClient` - the contract the list core consumes
//! - `HttpCatalogClient` - reqwest implementation against the public API
//! - `types` - character records, response envelope, errors

mod client;
mod types;

use async_trait::async_trait;

pub use client::{validate_base_url, HttpCatalogClient, DEFAULT_BASE_URL};
pub use types::{ApiPage, CatalogError, Character, CharacterId, FetchOutcome, PageInfo, Place};

/// Source of character pages and search results.
///
/// Implementations must eventually resolve or fail every call; the caller
/// imposes no timeout of its own.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of the full catalog. Pages start at 1.
    ///
    /// Past the last page implementations return [`CatalogError::NotFound`].
    async fn fetch_page(&self, page: u32) -> Result<Vec<Character>, CatalogError>;

    /// Fetch every character whose name matches `term`.
    ///
    /// An unmatched term may come back either as `Ok(vec![])` or as
    /// [`CatalogError::NoMatches`].
    async fn search(&self, term: &str) -> Result<Vec<Character>, CatalogError>;
}
