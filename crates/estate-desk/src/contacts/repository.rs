use serde::Serialize;

use super::domain::{Contact, NewContact};
use crate::accounts::UserId;
use crate::listings::ListingId;
use crate::storage::RepositoryError;

/// Storage abstraction for inquiries.
///
/// `insert` must reject a second row for the same (listing, user) pair with
/// [`RepositoryError::Conflict`]; rows without a user are never deduplicated.
pub trait ContactRepository: Send + Sync {
    fn insert(&self, contact: NewContact) -> Result<Contact, RepositoryError>;
    fn exists_for_user(&self, listing_id: ListingId, user_id: UserId)
        -> Result<bool, RepositoryError>;
    /// Inquiries made by `user_id`, newest first.
    fn for_user(&self, user_id: UserId) -> Result<Vec<Contact>, RepositoryError>;
}

/// Outbound hook telling realtors and operations about a new inquiry (e.g. an e-mail adapter).
pub trait InquiryNotifier: Send + Sync {
    fn notify(&self, notification: InquiryNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryNotification {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    pub contact: Contact,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
