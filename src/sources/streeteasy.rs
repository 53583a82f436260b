use serde::Deserialize;
use serde_json::Map;

use super::SourceRecord;
use crate::de::{nullable, opt_text, present, price};
use crate::listing::{Listing, Marketplace, Measure};

/// A record from the StreetEasy actor dataset. Only the `title`,
/// `addr_street` and `price` keys are required.
///
/// City, state and featured flag fall back to defaults only when the key is
/// absent; an explicit `null` is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct StreetEasyRecord {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub title: Option<String>,
    pub addr_street: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub addr_unit: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub addr_city: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub addr_state: Option<Option<String>>,
    #[serde(default)]
    pub addr_zip: Option<Measure>,
    #[serde(deserialize_with = "price")]
    pub price: i64,
    #[serde(default)]
    pub bedrooms: Option<Measure>,
    #[serde(default)]
    pub bathrooms: Option<Measure>,
    #[serde(default)]
    pub size_sqft: Option<Measure>,
    #[serde(default)]
    pub medium_image_uri: Option<String>,
    #[serde(default)]
    pub source_label: Option<Measure>,
    #[serde(default)]
    pub area_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub is_featured: Option<Option<bool>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// StreetEasy prefixes units with a marker character (`#4B`); drop it.
fn strip_unit_marker(unit: String) -> String {
    unit.chars().skip(1).collect()
}

impl SourceRecord for StreetEasyRecord {
    const MARKETPLACE: Marketplace = Marketplace::StreetEasy;

    fn into_listing(self, _stamped_at: &str) -> Listing {
        Listing {
            source_url: self.url,
            marketplace: vec![Self::MARKETPLACE],
            title: self.title,
            addr_street: self.addr_street,
            addr_unit: self.addr_unit.map(strip_unit_marker),
            addr_city: self.addr_city.unwrap_or_else(|| Some("Manhattan".to_string())),
            addr_state: self.addr_state.unwrap_or_else(|| Some("NY".to_string())),
            addr_zip: self.addr_zip,
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            size_sqft: self.size_sqft,
            photo_url: self.medium_image_uri,
            listed_by: self.source_label,
            area_name: self.area_name,
            description: self.description,
            is_featured: self.is_featured.unwrap_or(Some(false)),
            created_at: self.created_at,
            amenities: None,
            addr_lat: None,
            addr_lon: None,
            id: None,
            lion_score: None,
            extra: Map::new(),
        }
    }
}
