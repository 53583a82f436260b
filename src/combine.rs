//! Stage 1: union the three marketplace dumps, normalize and deduplicate.

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use tracing::info;

use crate::dedupe::dedupe;
use crate::listing::Listing;
use crate::output::read_bytes;
use crate::sources::{
    CompassRecord, RentHopRecord, SourceRecord, StreetEasyRecord, normalize_all, parse_records,
};
use crate::stats::CombineStats;

/// Paths of the raw per-marketplace dumps.
#[derive(Debug, Clone)]
pub struct SourcePaths<'a> {
    pub compass: &'a Path,
    pub renthop: &'a Path,
    pub streeteasy: &'a Path,
}

/// Timestamp in the `YYYY-MM-DDTHH:MM:SS.ffffff` local form used for
/// `created_at` on sources that do not carry one.
pub fn local_stamp() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn load<R: SourceRecord>(path: &Path, stamped_at: &str) -> Result<Vec<Listing>> {
    let records = parse_records::<R>(&read_bytes(path)?)?;
    info!(
        marketplace = %R::MARKETPLACE,
        path = %path.display(),
        records = records.len(),
        "Source loaded"
    );
    Ok(normalize_all(records, stamped_at))
}

/// Normalizes already-loaded listings (Compass, RentHop, StreetEasy order)
/// and runs the dedup pass.
pub fn combine_listings(
    compass: Vec<Listing>,
    renthop: Vec<Listing>,
    streeteasy: Vec<Listing>,
) -> (Vec<Listing>, CombineStats) {
    let inputs = [compass.len(), renthop.len(), streeteasy.len()];
    let (unique, counts) = dedupe(compass.into_iter().chain(renthop).chain(streeteasy));
    let stats = CombineStats::from_run(inputs, counts, &unique);
    (unique, stats)
}

/// Loads all three dumps and combines them.
#[tracing::instrument(skip_all)]
pub fn combine_files(paths: &SourcePaths<'_>, stamped_at: &str) -> Result<(Vec<Listing>, CombineStats)> {
    let compass = load::<CompassRecord>(paths.compass, stamped_at)?;
    let renthop = load::<RentHopRecord>(paths.renthop, stamped_at)?;
    let streeteasy = load::<StreetEasyRecord>(paths.streeteasy, stamped_at)?;

    let (unique, stats) = combine_listings(compass, renthop, streeteasy);
    info!(
        unique = stats.unique,
        merged = stats.merged,
        rejected = stats.rejected,
        outside_streeteasy = stats.outside_streeteasy,
        "Listings combined"
    );
    Ok((unique, stats))
}
