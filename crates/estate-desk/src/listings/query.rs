use serde::{Deserialize, Serialize};

use super::domain::Listing;

/// Filter evaluated by [`ListingRepository::query`](super::ListingRepository::query).
///
/// Every populated field narrows the result; an empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub published_only: bool,
    /// Case-insensitive substring of the description.
    pub keywords: Option<String>,
    /// Case-insensitive exact match.
    pub city: Option<String>,
    /// Case-insensitive exact match.
    pub state: Option<String>,
    pub max_bedrooms: Option<i64>,
    pub max_price: Option<i64>,
}

impl ListingQuery {
    pub fn published() -> Self {
        Self {
            published_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if self.published_only && !listing.is_published {
            return false;
        }
        if let Some(keywords) = &self.keywords {
            if !listing
                .description
                .to_lowercase()
                .contains(&keywords.to_lowercase())
            {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if listing.city.to_lowercase() != city.to_lowercase() {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if listing.state.to_lowercase() != state.to_lowercase() {
                return false;
            }
        }
        if let Some(max_bedrooms) = self.max_bedrooms {
            if i64::from(listing.bedrooms) > max_bedrooms {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if i64::try_from(listing.price).map_or(true, |price| price > max_price) {
                return false;
            }
        }
        true
    }
}

/// Raw search parameters exactly as received, blanks included, echoed back so
/// the form can be refilled. Blank values do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// A numeric search parameter that is not an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be a whole number, got '{value}'")]
pub struct InvalidFilter {
    pub field: &'static str,
    pub value: String,
}

impl SearchParams {
    /// Coerce the raw parameters into a query over all listings, published or not.
    pub fn to_query(&self) -> Result<ListingQuery, InvalidFilter> {
        Ok(ListingQuery {
            published_only: false,
            keywords: present(self.keywords.as_deref()).map(str::to_string),
            city: present(self.city.as_deref()).map(str::to_string),
            state: present(self.state.as_deref()).map(str::to_string),
            max_bedrooms: parse_ceiling("bedrooms", present(self.bedrooms.as_deref()))?,
            max_price: parse_ceiling("price", present(self.price.as_deref()))?,
        })
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_ceiling(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, InvalidFilter> {
    raw.map(|value| {
        value.parse::<i64>().map_err(|_| InvalidFilter {
            field,
            value: value.to_string(),
        })
    })
    .transpose()
}
