use serde::Deserialize;
use serde_json::Map;

use super::SourceRecord;
use crate::de::{nullable, opt_text, price};
use crate::listing::{Listing, Marketplace, Measure};

/// A record from the Compass export.
///
/// Most keys must be present even when their value is null; a missing key
/// fails the whole dump.
#[derive(Debug, Clone, Deserialize)]
pub struct CompassRecord {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub title: Option<String>,
    pub addr_street: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub zip_code: Option<Measure>,
    #[serde(deserialize_with = "price")]
    pub monthly_rent: i64,
    #[serde(deserialize_with = "nullable")]
    pub bedrooms: Option<Measure>,
    #[serde(deserialize_with = "nullable")]
    pub bathrooms: Option<Measure>,
    #[serde(deserialize_with = "nullable")]
    pub sqft: Option<Measure>,
    #[serde(deserialize_with = "nullable")]
    pub photo_url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub listed_by: Option<Measure>,
    #[serde(deserialize_with = "nullable")]
    pub area_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub amenities: Option<Vec<String>>,
}

impl CompassRecord {
    pub(super) fn into_listing_as(self, market: Marketplace, stamped_at: &str) -> Listing {
        Listing {
            source_url: self.url,
            marketplace: vec![market],
            title: self.title,
            addr_street: self.addr_street,
            addr_unit: self.unit_number,
            addr_city: Some("Manhattan".to_string()),
            addr_state: Some("NY".to_string()),
            addr_zip: self.zip_code,
            price: self.monthly_rent,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            size_sqft: self.sqft,
            photo_url: self.photo_url,
            listed_by: self.listed_by,
            area_name: self.area_name,
            description: self.description,
            is_featured: Some(false),
            created_at: Some(stamped_at.to_string()),
            amenities: Some(self.amenities),
            addr_lat: None,
            addr_lon: None,
            id: None,
            lion_score: None,
            extra: Map::new(),
        }
    }
}

impl SourceRecord for CompassRecord {
    const MARKETPLACE: Marketplace = Marketplace::Compass;

    fn into_listing(self, stamped_at: &str) -> Listing {
        self.into_listing_as(Self::MARKETPLACE, stamped_at)
    }
}
