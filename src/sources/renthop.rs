use serde::Deserialize;

use super::{CompassRecord, SourceRecord};
use crate::listing::{Listing, Marketplace};

/// A record from the RentHop export. RentHop dumps were produced by the same
/// scraper as Compass and share its shape and mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct RentHopRecord(pub CompassRecord);

impl SourceRecord for RentHopRecord {
    const MARKETPLACE: Marketplace = Marketplace::RentHop;

    fn into_listing(self, stamped_at: &str) -> Listing {
        self.0.into_listing_as(Self::MARKETPLACE, stamped_at)
    }
}
