//! Neighborhood enrichment: reverse geocode, then snap the provider's
//! locality name onto a canonical Manhattan neighborhood list.

use serde::Serialize;
use tracing::{info, warn};

use crate::geocode::similarity::weighted_ratio;
use crate::listing::Listing;
use crate::services::geocoder::{Coordinates, Geocoder};

pub const MANHATTAN_NEIGHBORHOODS: &[&str] = &[
    "Chelsea",
    "Chinatown",
    "East Harlem",
    "East Village",
    "Financial District",
    "Flatiron",
    "Gramercy Park",
    "Greenwich Village",
    "Hells Kitchen",
    "Lincoln Square",
    "Little Italy",
    "Lower East Side",
    "Midtown",
    "Midtown East",
    "Midtown South",
    "Midtown West",
    "Morningside",
    "Soho",
    "Tribeca",
    "Upper East Side",
    "Upper West Side",
    "West Harlem",
    "West Village",
];

pub const MATCH_THRESHOLD: u8 = 70;
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct NeighborhoodMatcher {
    canonical: Vec<String>,
    threshold: u8,
}

impl Default for NeighborhoodMatcher {
    fn default() -> Self {
        Self::new(
            MANHATTAN_NEIGHBORHOODS.iter().map(|s| s.to_string()).collect(),
            MATCH_THRESHOLD,
        )
    }
}

impl NeighborhoodMatcher {
    pub fn new(canonical: Vec<String>, threshold: u8) -> Self {
        Self {
            canonical,
            threshold,
        }
    }

    /// Highest-scoring canonical name and its score. Ties keep the earlier
    /// entry in the list.
    pub fn best_match(&self, raw: &str) -> Option<(&str, u8)> {
        let mut best: Option<(&str, u8)> = None;
        for name in &self.canonical {
            let score = weighted_ratio(raw, name);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((name.as_str(), score));
            }
        }
        best
    }

    /// Canonical name for a raw locality, or `"Unknown"` when there is none
    /// or the best match scores below the threshold.
    pub fn canonicalize(&self, raw: Option<&str>) -> String {
        raw.and_then(|r| self.best_match(r))
            .filter(|(_, score)| *score >= self.threshold)
            .map_or_else(|| UNKNOWN.to_string(), |(name, _)| name.to_string())
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct EnrichReport {
    pub attempted: usize,
    pub matched: usize,
    pub unknown: usize,
    pub lookup_failures: usize,
}

/// Fills `area_name` for listings that have coordinates but no
/// neighborhood. Lookup failures are logged and recorded as `"Unknown"`.
#[tracing::instrument(skip_all)]
pub async fn enrich_neighborhoods<G>(
    listings: &mut [Listing],
    geocoder: &G,
    matcher: &NeighborhoodMatcher,
) -> EnrichReport
where
    G: Geocoder + ?Sized,
{
    let mut report = EnrichReport::default();

    for listing in listings.iter_mut() {
        if listing.area_name.is_some() || !listing.has_coordinates() {
            continue;
        }
        let (Some(lat), Some(lon)) = (listing.addr_lat, listing.addr_lon) else {
            continue;
        };
        report.attempted += 1;

        let raw = match geocoder.reverse(Coordinates { lat, lon }).await {
            Ok(details) => details.and_then(|d| d.locality().map(str::to_string)),
            Err(e) => {
                warn!(lat, lon, error = %e, "Reverse geocoding failed");
                report.lookup_failures += 1;
                None
            }
        };

        let mapped = matcher.canonicalize(raw.as_deref());
        if mapped == UNKNOWN {
            report.unknown += 1;
        } else {
            report.matched += 1;
        }
        info!(title = listing.title.as_deref().unwrap_or(""), raw = raw.as_deref().unwrap_or(""), area = %mapped, "Neighborhood assigned");
        listing.area_name = Some(mapped);
    }

    info!(
        attempted = report.attempted,
        matched = report.matched,
        unknown = report.unknown,
        "Neighborhood enrichment finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::testing::FakeGeocoder;
    use crate::listing::Marketplace;
    use crate::listing::fixtures::listing;
    use crate::services::geocoder::AddressDetails;

    #[test]
    fn test_abbreviation_maps_to_canonical() {
        let m = NeighborhoodMatcher::default();
        assert_eq!(m.canonicalize(Some("Morningside Hts")), "Morningside");
        assert_eq!(m.canonicalize(Some("Hell's Kitchen")), "Hells Kitchen");
        assert_eq!(m.canonicalize(Some("upper west side")), "Upper West Side");
    }

    #[test]
    fn test_below_threshold_is_unknown() {
        let strict = NeighborhoodMatcher::new(vec!["Morningside".into()], 100);
        assert_eq!(strict.canonicalize(Some("Morningside Hts")), UNKNOWN);

        let m = NeighborhoodMatcher::default();
        assert_eq!(m.canonicalize(Some("Zzyzx")), UNKNOWN);
        assert_eq!(m.canonicalize(None), UNKNOWN);
    }

    #[test]
    fn test_ties_keep_first_entry() {
        let m = NeighborhoodMatcher::new(vec!["Soho".into(), "soho".into()], 70);
        assert_eq!(m.best_match("SOHO"), Some(("Soho", 100)));
    }

    #[tokio::test]
    async fn test_enrich_only_touches_located_listings_without_area() {
        let mut located = listing(Marketplace::StreetEasy, "1 A St", None, 1);
        located.addr_lat = Some(40.81);
        located.addr_lon = Some(-73.96);

        let mut named = located.clone();
        named.area_name = Some("Manhattan Valley".into());

        let unlocated = listing(Marketplace::StreetEasy, "2 B St", None, 1);

        let mut failing = located.clone();
        failing.addr_lat = Some(1.0);

        let geo = FakeGeocoder::default()
            .with_reverse(
                40.81,
                AddressDetails {
                    neighbourhood: Some("Morningside Heights".into()),
                    ..Default::default()
                },
            )
            .failing_at(1.0);

        let mut listings = vec![located, named, unlocated, failing];
        let report = enrich_neighborhoods(&mut listings, &geo, &NeighborhoodMatcher::default()).await;

        assert_eq!(listings[0].area_name.as_deref(), Some("Morningside"));
        assert_eq!(listings[1].area_name.as_deref(), Some("Manhattan Valley"));
        assert_eq!(listings[2].area_name, None);
        assert_eq!(listings[3].area_name.as_deref(), Some(UNKNOWN));
        assert_eq!(report.attempted, 2);
        assert_eq!(report.matched, 1);
        assert_eq!(report.lookup_failures, 1);
        assert_eq!(geo.reverse_calls(), 2);
    }
}
