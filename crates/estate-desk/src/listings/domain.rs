use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub u64);

impl ListingId {
    /// Parse a path segment; anything that is not a plain integer is no listing at all.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u64>().ok().map(Self)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Agent responsible for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realtor {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Property record. Listings are authored outside this service and only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub description: String,
    pub price: u64,
    pub bedrooms: u32,
    pub bathrooms: f32,
    pub garage: u32,
    pub sqft: u32,
    pub lot_size: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtor: Option<Realtor>,
    pub is_published: bool,
    pub list_date: DateTime<Utc>,
}

impl Listing {
    pub fn realtor_email(&self) -> Option<&str> {
        self.realtor.as_ref().map(|realtor| realtor.email.as_str())
    }
}
