//! Per-marketplace raw record shapes and their mapping into [`Listing`].
//!
//! Each source gets its own record struct; [`SourceRecord::into_listing`] is
//! the single place where that source's renames, defaults and coercions live.

mod compass;
mod renthop;
mod streeteasy;

pub use compass::CompassRecord;
pub use renthop::RentHopRecord;
pub use streeteasy::StreetEasyRecord;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::listing::{Listing, Marketplace};

/// A raw marketplace record that can be normalized into a [`Listing`].
pub trait SourceRecord: DeserializeOwned {
    const MARKETPLACE: Marketplace;

    /// Maps the record into the canonical shape. `stamped_at` is used for
    /// sources that carry no creation timestamp of their own.
    fn into_listing(self, stamped_at: &str) -> Listing;
}

/// Decodes a raw JSON dump (an array of objects) into typed records.
///
/// # Errors
///
/// Fails on malformed JSON, or on the first record missing a required key,
/// naming the marketplace and the record's position.
pub fn parse_records<R: SourceRecord>(bytes: &[u8]) -> Result<Vec<R>> {
    let raw: Vec<Value> = serde_json::from_slice(bytes)
        .with_context(|| format!("{} dump is not a JSON array", R::MARKETPLACE))?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, value)| {
            serde_json::from_value(value)
                .with_context(|| format!("{} record {idx} is malformed", R::MARKETPLACE))
        })
        .collect()
}

/// Normalizes every record of one source.
pub fn normalize_all<R: SourceRecord>(records: Vec<R>, stamped_at: &str) -> Vec<Listing> {
    records
        .into_iter()
        .map(|r| r.into_listing(stamped_at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_names_the_bad_record() {
        let bytes = br#"[
            {"title": "ok", "addr_street": "1 A St", "price": 100},
            {"title": "missing street", "price": 100}
        ]"#;
        let err = parse_records::<StreetEasyRecord>(bytes).unwrap_err();
        assert!(format!("{err:#}").contains("StreetEasy record 1"));
    }

    #[test]
    fn test_parse_records_rejects_non_array() {
        assert!(parse_records::<StreetEasyRecord>(br#"{"title": "x"}"#).is_err());
    }

    #[test]
    fn test_normalize_all_tags_marketplace() {
        let bytes = br#"[{"title": "a", "addr_street": "1 A St", "price": "900"}]"#;
        let records = parse_records::<StreetEasyRecord>(bytes).unwrap();
        let listings = normalize_all(records, "2025-01-01T00:00:00");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].marketplace, vec![Marketplace::StreetEasy]);
        assert_eq!(listings[0].price, 900);
    }
}
