//! Storage adapters shared by the feature repositories.

mod memory;

pub use memory::{
    InMemoryContactRepository, InMemoryListingRepository, InMemorySessionStore,
    InMemoryUserRepository,
};

use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Uniqueness rules a store must uphold on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    Username,
    Email,
    /// One inquiry per (listing, authenticated user).
    ListingInquiry,
}

impl fmt::Display for UniqueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniqueConstraint::Username => "users.username",
            UniqueConstraint::Email => "users.email",
            UniqueConstraint::ListingInquiry => "contacts.listing_id_user_id",
        };
        f.write_str(name)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("unique constraint {0} violated")]
    Conflict(UniqueConstraint),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub(crate) fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    table: &'static str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{table} lock poisoned")))
}
