//! Listing catalog: published index, detail, search, and CSV import.

pub mod choices;
pub mod domain;
pub mod import;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;

pub use choices::SearchChoices;
pub use domain::{Listing, ListingId, Realtor};
pub use import::{ListingImportError, ListingImporter};
pub use query::{InvalidFilter, ListingQuery, SearchParams};
pub use repository::ListingRepository;
pub use router::listings_router;
pub use service::{LandingPage, ListingError, ListingService, SearchResults};
