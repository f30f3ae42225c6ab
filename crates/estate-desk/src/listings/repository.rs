use super::domain::{Listing, ListingId};
use super::query::ListingQuery;
use crate::storage::RepositoryError;

/// Read access to the externally managed listing catalog.
pub trait ListingRepository: Send + Sync {
    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError>;
    /// Listings matching `query`, newest `list_date` first.
    fn query(&self, query: &ListingQuery) -> Result<Vec<Listing>, RepositoryError>;
}
