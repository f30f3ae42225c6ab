//! Catalog import from a CSV export of the listing system.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use super::domain::{Listing, ListingId, Realtor};
use crate::web::empty_string_as_none;

#[derive(Debug, thiserror::Error)]
pub enum ListingImportError {
    #[error("failed to read listing export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listing CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("listing {0} appears more than once")]
    DuplicateId(ListingId),
    #[error("listing {id} has unparseable {field} '{value}'")]
    InvalidValue {
        id: ListingId,
        field: &'static str,
        value: String,
    },
}

pub struct ListingImporter;

impl ListingImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Listing>, ListingImportError> {
        let file = std::fs::File::open(path.as_ref())?;
        let listings = Self::from_reader(file)?;
        info!(path = %path.as_ref().display(), count = listings.len(), "listings imported");
        Ok(listings)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Listing>, ListingImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut seen = HashSet::new();
        let mut listings = Vec::new();

        for row in csv_reader.deserialize::<ListingRow>() {
            let listing = row?.into_listing()?;
            if !seen.insert(listing.id) {
                return Err(ListingImportError::DuplicateId(listing.id));
            }
            listings.push(listing);
        }

        Ok(listings)
    }
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    id: u64,
    title: String,
    #[serde(default)]
    address: String,
    city: String,
    state: String,
    #[serde(default)]
    zipcode: String,
    #[serde(default)]
    description: String,
    price: u64,
    bedrooms: u32,
    #[serde(default)]
    bathrooms: Option<f32>,
    #[serde(default)]
    garage: Option<u32>,
    #[serde(default)]
    sqft: Option<u32>,
    #[serde(default)]
    lot_size: Option<f32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    realtor_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    realtor_email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    realtor_phone: Option<String>,
    is_published: String,
    list_date: String,
}

impl ListingRow {
    fn into_listing(self) -> Result<Listing, ListingImportError> {
        let id = ListingId(self.id);
        let is_published =
            parse_flag(&self.is_published).ok_or_else(|| ListingImportError::InvalidValue {
                id,
                field: "is_published",
                value: self.is_published.clone(),
            })?;
        let list_date =
            parse_list_date(&self.list_date).ok_or_else(|| ListingImportError::InvalidValue {
                id,
                field: "list_date",
                value: self.list_date.clone(),
            })?;

        let realtor = match (self.realtor_name, self.realtor_email) {
            (Some(name), Some(email)) => Some(Realtor {
                name,
                email,
                phone: self.realtor_phone,
            }),
            _ => None,
        };

        Ok(Listing {
            id,
            title: self.title,
            address: self.address,
            city: self.city,
            state: self.state,
            zipcode: self.zipcode,
            description: self.description,
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms.unwrap_or_default(),
            garage: self.garage.unwrap_or_default(),
            sqft: self.sqft.unwrap_or_default(),
            lot_size: self.lot_size.unwrap_or_default(),
            realtor,
            is_published,
            list_date,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_list_date(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
