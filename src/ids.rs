use crate::listing::Listing;

/// Gives every listing its position in the file as a string id, replacing
/// whatever id it had before. Returns how many listings were labeled.
pub fn assign_ids(listings: &mut [Listing]) -> usize {
    for (idx, listing) in listings.iter_mut().enumerate() {
        listing.id = Some(idx.to_string());
    }
    listings.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Marketplace;
    use crate::listing::fixtures::listing;

    #[test]
    fn test_ids_follow_position_and_overwrite() {
        let mut listings = vec![
            listing(Marketplace::Compass, "1 A St", None, 1),
            listing(Marketplace::Compass, "2 B St", None, 1),
        ];
        listings[1].id = Some("stale".into());

        assert_eq!(assign_ids(&mut listings), 2);
        assert_eq!(listings[0].id.as_deref(), Some("0"));
        assert_eq!(listings[1].id.as_deref(), Some("1"));
    }
}
