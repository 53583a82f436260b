//! Forward-geocoding listings that have no usable coordinates.

use serde::Serialize;
use tracing::{info, warn};

use crate::listing::{Listing, Measure};
use crate::services::geocoder::Geocoder;

const DEFAULT_CITY: &str = "New York";
const DEFAULT_STATE: &str = "NY";

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// `"{street}, {city}, {state}"` plus `" {zip}"` when a zip is known.
/// Listings without a street cannot be geocoded.
pub fn address_query(listing: &Listing) -> Option<String> {
    let street = non_empty(Some(&listing.addr_street))?;
    let city = non_empty(listing.addr_city.as_deref()).unwrap_or(DEFAULT_CITY);
    let state = non_empty(listing.addr_state.as_deref()).unwrap_or(DEFAULT_STATE);

    let mut query = format!("{street}, {city}, {state}");
    let zip = listing.addr_zip.as_ref().map(Measure::to_text);
    if let Some(zip) = non_empty(zip.as_deref()) {
        query.push(' ');
        query.push_str(zip);
    }
    Some(query)
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct BackfillReport {
    pub attempted: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Looks up coordinates for listings missing them, stopping after `limit`
/// lookups when one is given. A lookup error is logged and counted; the
/// listing is left as it was.
#[tracing::instrument(skip(listings, geocoder))]
pub async fn backfill_coordinates<G>(
    listings: &mut [Listing],
    geocoder: &G,
    limit: Option<usize>,
) -> BackfillReport
where
    G: Geocoder + ?Sized,
{
    let mut report = BackfillReport::default();

    for listing in listings.iter_mut() {
        if limit.is_some_and(|max| report.attempted >= max) {
            break;
        }
        if listing.has_coordinates() {
            continue;
        }
        let Some(query) = address_query(listing) else {
            continue;
        };
        report.attempted += 1;

        match geocoder.search(&query).await {
            Ok(Some(at)) if at.lat != 0.0 && at.lon != 0.0 => {
                listing.addr_lat = Some(at.lat);
                listing.addr_lon = Some(at.lon);
                report.resolved += 1;
                info!(%query, lat = at.lat, lon = at.lon, "Geocoded");
            }
            Ok(_) => {
                report.not_found += 1;
                info!(%query, "No geocoding result");
            }
            Err(e) => {
                report.failed += 1;
                warn!(%query, error = %e, "Failed to geocode");
            }
        }
    }

    info!(
        attempted = report.attempted,
        resolved = report.resolved,
        not_found = report.not_found,
        failed = report.failed,
        "Coordinate backfill finished"
    );
    report
}
