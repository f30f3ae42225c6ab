use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::UserId;
use crate::listings::ListingId;
use crate::web::empty_string_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A persisted inquiry about a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub listing_id: ListingId,
    /// Listing title captured at submission time.
    pub listing: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub contact_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub listing_id: ListingId,
    pub listing: String,
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub contact_date: DateTime<Utc>,
}

/// Inquiry form as posted from a listing page.
///
/// `user_id` is accepted for form compatibility only; the submitter is always
/// taken from the request's session.
#[derive(Debug, Clone, Deserialize)]
pub struct InquiryForm {
    pub listing_id: ListingId,
    pub listing: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub realtor_email: Option<String>,
}
