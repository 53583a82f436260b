//! Trait and types for forward and reverse geocoding.

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// The parts of a reverse-geocoded address that can name a neighborhood.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddressDetails {
    #[serde(default)]
    pub neighbourhood: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub city_district: Option<String>,
}

impl AddressDetails {
    /// The most specific non-empty locality name: neighbourhood, then
    /// suburb, then city district.
    pub fn locality(&self) -> Option<&str> {
        [&self.neighbourhood, &self.suburb, &self.city_district]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .find(|s| !s.is_empty())
    }
}

/// Abstraction over a geocoding provider (e.g., Nominatim).
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// First match for a free-text address, if any.
    async fn search(&self, query: &str) -> Result<Option<Coordinates>>;

    /// Address details for a coordinate, if the provider knows the spot.
    async fn reverse(&self, at: Coordinates) -> Result<Option<AddressDetails>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locality_preference_order() {
        let a = AddressDetails {
            neighbourhood: Some(String::new()),
            suburb: Some("Manhattan Valley".into()),
            city_district: Some("Manhattan".into()),
        };
        assert_eq!(a.locality(), Some("Manhattan Valley"));

        let a = AddressDetails {
            neighbourhood: Some("Morningside Heights".into()),
            ..Default::default()
        };
        assert_eq!(a.locality(), Some("Morningside Heights"));

        assert_eq!(AddressDetails::default().locality(), None);
    }
}
