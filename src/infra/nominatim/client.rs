use std::num::NonZeroU32;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::fetch::{HttpClient, get_json};
use crate::services::geocoder::{AddressDetails, Coordinates, Geocoder};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";
pub const DEFAULT_USER_AGENT: &str = "LionLeaseApp/1.0";

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Deserialize)]
struct SearchHit {
    #[serde(deserialize_with = "coordinate")]
    lat: f64,
    #[serde(deserialize_with = "coordinate")]
    lon: f64,
}

#[derive(Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<AddressDetails>,
    #[serde(default)]
    error: Option<String>,
}

/// Nominatim reports coordinates as decimal strings.
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("coordinate out of range")),
        other => Err(serde::de::Error::custom(format!(
            "expected a coordinate, got {other}"
        ))),
    }
}

/// Nominatim search / reverse client.
///
/// Every request waits on a token-bucket limiter first, so the public
/// instance's one-request-per-second policy holds across both endpoints.
pub struct NominatimClient<C> {
    http: C,
    base_url: Url,
    limiter: DirectLimiter,
}

impl<C: HttpClient> NominatimClient<C> {
    pub fn new(http: C, base_url: &str, requests_per_second: NonZeroU32) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).with_context(|| format!("invalid geocoder URL {base_url:?}"))?;

        Ok(Self {
            http,
            base_url,
            limiter: RateLimiter::direct(Quota::per_second(requests_per_second)),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }
}

#[async_trait]
impl<C: HttpClient> Geocoder for NominatimClient<C> {
    async fn search(&self, query: &str) -> Result<Option<Coordinates>> {
        let url = self.endpoint("search", &[("q", query), ("format", "json"), ("limit", "1")])?;

        self.limiter.until_ready().await;
        debug!(query, "Geocoding address");
        let hits: Vec<SearchHit> = get_json(&self.http, url).await?;

        Ok(hits.first().map(|h| Coordinates {
            lat: h.lat,
            lon: h.lon,
        }))
    }

    async fn reverse(&self, at: Coordinates) -> Result<Option<AddressDetails>> {
        let lat = at.lat.to_string();
        let lon = at.lon.to_string();
        let url = self.endpoint(
            "reverse",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("addressdetails", "1"),
            ],
        )?;

        self.limiter.until_ready().await;
        debug!(lat = at.lat, lon = at.lon, "Reverse geocoding");
        let resp: ReverseResponse = get_json(&self.http, url).await?;

        if let Some(error) = resp.error {
            debug!(error = %error, "Reverse lookup found nothing");
            return Ok(None);
        }
        Ok(resp.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::CannedClient;

    fn client(responses: Vec<(u16, &str)>) -> NominatimClient<CannedClient> {
        let fast = NonZeroU32::new(1000).unwrap();
        NominatimClient::new(CannedClient::new(responses), "https://geo.test/nominatim", fast).unwrap()
    }

    #[tokio::test]
    async fn test_search_takes_first_hit() {
        let geo = client(vec![(
            200,
            r#"[{"lat": "40.8075", "lon": "-73.9626", "display_name": "x"},
                {"lat": "1", "lon": "2"}]"#,
        )]);
        let hit = geo.search("2880 Broadway, Manhattan, NY 10025").await.unwrap();
        assert_eq!(hit, Some(Coordinates { lat: 40.8075, lon: -73.9626 }));

        let seen = geo.http.requests();
        assert_eq!(seen[0].url.path(), "/nominatim/search");
        let pairs: Vec<(String, String)> = seen[0].url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".into(), "2880 Broadway, Manhattan, NY 10025".into())));
        assert!(pairs.contains(&("limit".into(), "1".into())));
    }

    #[tokio::test]
    async fn test_search_empty_result() {
        let geo = client(vec![(200, "[]")]);
        assert_eq!(geo.search("nowhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_search_http_error_is_error() {
        let geo = client(vec![(429, "slow down")]);
        assert!(geo.search("anywhere").await.is_err());
    }

    #[tokio::test]
    async fn test_reverse_reads_address_details() {
        let geo = client(vec![(
            200,
            r#"{"address": {"suburb": "Manhattan", "neighbourhood": "Morningside Heights", "road": "Broadway"}}"#,
        )]);
        let details = geo
            .reverse(Coordinates { lat: 40.81, lon: -73.96 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.locality(), Some("Morningside Heights"));

        let seen = geo.http.requests();
        let pairs: Vec<(String, String)> = seen[0].url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("addressdetails".into(), "1".into())));
        assert!(pairs.contains(&("lat".into(), "40.81".into())));
    }

    #[tokio::test]
    async fn test_reverse_error_body_means_no_result() {
        let geo = client(vec![(200, r#"{"error": "Unable to geocode"}"#)]);
        let details = geo.reverse(Coordinates { lat: 0.1, lon: 0.1 }).await.unwrap();
        assert_eq!(details, None);
    }
}
