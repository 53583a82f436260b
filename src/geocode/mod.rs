//! Geocoding stages: coordinate backfill and neighborhood enrichment.

pub mod backfill;
pub mod neighborhoods;
pub mod similarity;

pub use backfill::{BackfillReport, address_query, backfill_coordinates};
pub use neighborhoods::{
    EnrichReport, MANHATTAN_NEIGHBORHOODS, MATCH_THRESHOLD, NeighborhoodMatcher,
    enrich_neighborhoods,
};
