//! The canonical listing record every stage reads and writes.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::de::{present, price};
use crate::scoring::lion_score::LionScore;

/// Source platform a listing was pulled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marketplace {
    Compass,
    RentHop,
    StreetEasy,
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Marketplace::Compass => "Compass",
            Marketplace::RentHop => "RentHop",
            Marketplace::StreetEasy => "StreetEasy",
        };
        f.write_str(name)
    }
}

/// A scalar exactly as the marketplace exported it: room counts, floor
/// areas, zip codes, agent names.
///
/// Values are kept verbatim (`2`, `1.5`, `"Studio"`, `"1,200"`, `10025`) so a
/// normalize/serialize cycle does not rewrite them. Numeric interpretation
/// happens only when scoring; text interpretation only when building
/// geocoder queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(Number),
    Text(String),
}

impl Measure {
    /// Best-effort numeric reading. Thousands separators and dash
    /// placeholders are stripped; unparsable text yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Measure::Number(n) => n.as_f64(),
            Measure::Text(t) => parse_loose(t),
        }
        .filter(|f| f.is_finite())
    }

    /// The value as text, with numbers in their JSON form (`10025`).
    pub fn to_text(&self) -> String {
        match self {
            Measure::Number(n) => n.to_string(),
            Measure::Text(t) => t.clone(),
        }
    }

    /// Text value lower-cased and trimmed, for keyword checks like "studio".
    pub fn text_lower(&self) -> Option<String> {
        match self {
            Measure::Number(_) => None,
            Measure::Text(t) => Some(t.trim().to_lowercase()),
        }
    }
}

impl From<i64> for Measure {
    fn from(value: i64) -> Self {
        Measure::Number(value.into())
    }
}

impl From<&str> for Measure {
    fn from(value: &str) -> Self {
        Measure::Text(value.to_string())
    }
}

fn parse_loose(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .replace("\u{e2}\u{80}\u{94}", "")
        .replace('\u{2014}', "")
        .replace(',', "");
    cleaned.trim().parse::<f64>().ok()
}

/// One normalized apartment-rental record.
///
/// Fields a later stage adds (`id`, coordinates, `LionScore`) are omitted
/// from the JSON until set. Keys this struct does not know about are carried
/// through untouched in [`Listing::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub marketplace: Vec<Marketplace>,
    #[serde(default)]
    pub title: Option<String>,
    pub addr_street: String,
    #[serde(default)]
    pub addr_unit: Option<String>,
    #[serde(default)]
    pub addr_city: Option<String>,
    #[serde(default)]
    pub addr_state: Option<String>,
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
    pub photo_url: Option<String>,
    #[serde(default)]
    pub listed_by: Option<Measure>,
    #[serde(default)]
    pub area_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Absent for sources without amenities; `Some(None)` is an explicit
    /// `null` carried through from the source.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub amenities: Option<Option<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr_lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "LionScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lion_score: Option<LionScore>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    /// Both coordinates present and non-zero.
    pub fn has_coordinates(&self) -> bool {
        matches!(
            (self.addr_lat, self.addr_lon),
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0
        )
    }

    /// Street number presence: the admission filter for the combined file.
    pub fn has_street_number(&self) -> bool {
        self.addr_street
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// An untyped field carried in [`Listing::extra`].
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Accepts either a single marketplace name (pre-dedupe files) or a
/// non-empty list of them.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Marketplace>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Marketplace),
        Many(Vec<Marketplace>),
    }

    let markets = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(m) => vec![m],
        OneOrMany::Many(ms) => ms,
    };
    if markets.is_empty() {
        return Err(de::Error::invalid_length(0, &"at least one marketplace"));
    }
    Ok(markets)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal listing for tests; everything optional is empty.
    pub fn listing(market: Marketplace, street: &str, unit: Option<&str>, price: i64) -> Listing {
        Listing {
            source_url: None,
            marketplace: vec![market],
            title: Some(format!("{street} {}", unit.unwrap_or(""))),
            addr_street: street.to_string(),
            addr_unit: unit.map(str::to_string),
            addr_city: Some("Manhattan".to_string()),
            addr_state: Some("NY".to_string()),
            addr_zip: None,
            price,
            bedrooms: None,
            bathrooms: None,
            size_sqft: None,
            photo_url: None,
            listed_by: None,
            area_name: None,
            description: None,
            is_featured: Some(false),
            created_at: None,
            amenities: None,
            addr_lat: None,
            addr_lon: None,
            id: None,
            lion_score: None,
            extra: Map::new(),
        }
    }
}
