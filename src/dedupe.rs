//! Cross-marketplace deduplication.
//!
//! One forward pass over normalized listings. The accumulator maps a
//! `(street, price)` key to the position of the first listing seen with it;
//! later listings with the same key only contribute their marketplace tag.
//! Distinct units at the same street and price collapse into one entry.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::trace;

use crate::listing::Listing;

/// Identity used to merge duplicates across sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub street: String,
    pub price: i64,
}

impl DedupKey {
    pub fn of(listing: &Listing) -> Self {
        Self {
            street: listing.addr_street.clone(),
            price: listing.price,
        }
    }
}

/// What happened to one listing fed to [`Deduplicator::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Street does not start with a number; dropped.
    Rejected,
    /// No unit designator; admitted without a key lookup.
    Standalone,
    /// First listing with its key.
    Inserted,
    /// Key already seen; marketplaces folded into the earlier entry.
    Merged,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupCounts {
    pub rejected: usize,
    pub standalone: usize,
    pub inserted: usize,
    pub merged: usize,
}

impl DedupCounts {
    fn record(&mut self, admission: Admission) {
        match admission {
            Admission::Rejected => self.rejected += 1,
            Admission::Standalone => self.standalone += 1,
            Admission::Inserted => self.inserted += 1,
            Admission::Merged => self.merged += 1,
        }
    }
}

/// Accumulator threaded through the dedup pass.
#[derive(Debug, Default)]
pub struct Deduplicator {
    entries: Vec<Listing>,
    seen: HashMap<DedupKey, usize>,
    counts: DedupCounts,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listing: Listing) -> Admission {
        let admission = self.admit(listing);
        self.counts.record(admission);
        admission
    }

    fn admit(&mut self, listing: Listing) -> Admission {
        if !listing.has_street_number() {
            trace!(street = %listing.addr_street, "Dropping listing without street number");
            return Admission::Rejected;
        }

        if listing.addr_unit.is_none() {
            self.entries.push(listing);
            return Admission::Standalone;
        }

        match self.seen.entry(DedupKey::of(&listing)) {
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push(listing);
                Admission::Inserted
            }
            Entry::Occupied(slot) => {
                let representative = &mut self.entries[*slot.get()];
                for market in listing.marketplace {
                    if !representative.marketplace.contains(&market) {
                        representative.marketplace.push(market);
                    }
                }
                Admission::Merged
            }
        }
    }

    /// Unique listings in first-seen order, plus what the pass did.
    pub fn finish(self) -> (Vec<Listing>, DedupCounts) {
        (self.entries, self.counts)
    }
}

/// Runs a full dedup pass over `listings`.
pub fn dedupe<I>(listings: I) -> (Vec<Listing>, DedupCounts)
where
    I: IntoIterator<Item = Listing>,
{
    listings
        .into_iter()
        .fold(Deduplicator::new(), |mut acc, listing| {
            acc.push(listing);
            acc
        })
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Marketplace::{Compass, RentHop, StreetEasy};
    use crate::listing::fixtures::listing;

    #[test]
    fn test_same_street_and_price_merge_across_units() {
        let input = vec![
            listing(Compass, "12 Main St", Some("2A"), 2000),
            listing(RentHop, "12 Main St", Some("3B"), 2000),
        ];
        let (out, counts) = dedupe(input);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].marketplace, vec![Compass, RentHop]);
        assert_eq!(out[0].addr_unit.as_deref(), Some("2A"));
        assert_eq!(counts.inserted, 1);
        assert_eq!(counts.merged, 1);
    }

    #[test]
    fn test_first_seen_fields_win() {
        let mut first = listing(StreetEasy, "400 W 119th St", Some("5"), 3100);
        first.description = Some("first".into());
        let mut second = listing(Compass, "400 W 119th St", Some("5"), 3100);
        second.description = Some("second".into());

        let (out, _) = dedupe(vec![first, second]);
        assert_eq!(out[0].description.as_deref(), Some("first"));
        assert_eq!(out[0].marketplace, vec![StreetEasy, Compass]);
    }

    #[test]
    fn test_marketplace_not_duplicated() {
        let input = vec![
            listing(Compass, "1 A St", Some("1"), 100),
            listing(Compass, "1 A St", Some("2"), 100),
            listing(RentHop, "1 A St", Some("3"), 100),
            listing(RentHop, "1 A St", Some("4"), 100),
        ];
        let (out, counts) = dedupe(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].marketplace, vec![Compass, RentHop]);
        assert_eq!(counts.merged, 3);
    }

    #[test]
    fn test_street_without_number_is_dropped() {
        let (out, counts) = dedupe(vec![
            listing(StreetEasy, "West End Ave", Some("7"), 2500),
            listing(StreetEasy, "", Some("7"), 2500),
        ]);
        assert!(out.is_empty());
        assert_eq!(counts.rejected, 2);
    }

    #[test]
    fn test_unitless_listings_are_never_merged() {
        let input = vec![
            listing(Compass, "12 Main St", None, 2000),
            listing(RentHop, "12 Main St", None, 2000),
            listing(StreetEasy, "12 Main St", Some("1"), 2000),
        ];
        let (out, counts) = dedupe(input);
        assert_eq!(out.len(), 3);
        assert_eq!(counts.standalone, 2);
        assert!(out.iter().all(|l| l.marketplace.len() == 1));
    }

    #[test]
    fn test_unitless_listing_does_not_claim_key() {
        let input = vec![
            listing(Compass, "12 Main St", None, 2000),
            listing(RentHop, "12 Main St", Some("1"), 2000),
            listing(StreetEasy, "12 Main St", Some("2"), 2000),
        ];
        let (out, _) = dedupe(input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].marketplace, vec![RentHop, StreetEasy]);
    }

    #[test]
    fn test_different_price_is_a_different_listing() {
        let input = vec![
            listing(Compass, "12 Main St", Some("2A"), 2000),
            listing(RentHop, "12 Main St", Some("2A"), 2100),
        ];
        let (out, _) = dedupe(input);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_output_keeps_first_seen_order() {
        let input = vec![
            listing(Compass, "3 C St", Some("1"), 1),
            listing(Compass, "1 A St", None, 1),
            listing(RentHop, "3 C St", Some("9"), 1),
            listing(RentHop, "2 B St", Some("1"), 1),
        ];
        let (out, _) = dedupe(input);
        let streets: Vec<_> = out.iter().map(|l| l.addr_street.as_str()).collect();
        assert_eq!(streets, vec!["3 C St", "1 A St", "2 B St"]);
    }

    #[test]
    fn test_push_reports_admission() {
        let mut acc = Deduplicator::new();
        assert_eq!(acc.push(listing(Compass, "Broadway", Some("1"), 1)), Admission::Rejected);
        assert_eq!(acc.push(listing(Compass, "1 A St", None, 1)), Admission::Standalone);
        assert_eq!(acc.push(listing(Compass, "1 A St", Some("1"), 1)), Admission::Inserted);
        assert_eq!(acc.push(listing(RentHop, "1 A St", Some("2"), 1)), Admission::Merged);
        assert_eq!(
            acc.finish().1,
            DedupCounts { rejected: 1, standalone: 1, inserted: 1, merged: 1 }
        );
    }
}
