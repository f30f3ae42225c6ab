use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::choices::SearchChoices;
use super::domain::{Listing, ListingId};
use super::query::{InvalidFilter, ListingQuery, SearchParams};
use super::repository::ListingRepository;
use crate::error::FailureKind;
use crate::pagination::{Page, Paginator};
use crate::storage::RepositoryError;

/// Number of listings featured on the landing page.
pub const FEATURED_LISTINGS: usize = 3;

/// Catalog reads: paginated index, detail, search, and the landing strip.
pub struct ListingService<L> {
    listings: Arc<L>,
    paginator: Paginator,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub listings: Vec<Listing>,
    pub values: SearchParams,
    pub choices: SearchChoices,
}

#[derive(Debug, Clone, Serialize)]
pub struct LandingPage {
    pub listings: Vec<Listing>,
    pub choices: SearchChoices,
}

impl<L> ListingService<L>
where
    L: ListingRepository + 'static,
{
    pub fn new(listings: Arc<L>) -> Self {
        Self::with_paginator(listings, Paginator::default())
    }

    pub fn with_paginator(listings: Arc<L>, paginator: Paginator) -> Self {
        Self {
            listings,
            paginator,
        }
    }

    /// Published listings, newest first, one page at a time.
    pub fn index(&self, page: Option<&str>) -> Result<Page<Listing>, ListingError> {
        let published = self.listings.query(&ListingQuery::published())?;
        Ok(self.paginator.get_page(published, page))
    }

    /// A single listing regardless of whether it is published.
    pub fn detail(&self, id: ListingId) -> Result<Listing, ListingError> {
        self.listings
            .fetch(id)?
            .ok_or(ListingError::NotFound(id))
    }

    /// Filtered search over every listing, published or not, unpaginated.
    pub fn search(&self, params: SearchParams) -> Result<SearchResults, ListingError> {
        let query = params.to_query()?;
        let listings = self.listings.query(&query)?;
        debug!(?query, matches = listings.len(), "listing search");

        Ok(SearchResults {
            listings,
            values: params,
            choices: SearchChoices::standard(),
        })
    }

    pub fn landing(&self) -> Result<LandingPage, ListingError> {
        let mut listings = self.listings.query(&ListingQuery::published())?;
        listings.truncate(FEATURED_LISTINGS);

        Ok(LandingPage {
            listings,
            choices: SearchChoices::standard(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("listing {0} not found")]
    NotFound(ListingId),
    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilter),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ListingError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ListingError::NotFound(_) => FailureKind::NotFound,
            ListingError::InvalidFilter(_) => FailureKind::Validation,
            ListingError::Repository(_) => FailureKind::Unavailable,
        }
    }
}
