//! Turning listings into a numeric design matrix.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::listing::{Listing, Measure};

/// Which feature recipe to train on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FeatureSet {
    /// Rooms, size and neighborhood; listings keyed by title, untitled ones
    /// are not scored. A missing neighborhood is its own `"Unknown"` category.
    Basic,
    /// Adds the no-fee flag and a studio indicator; listings keyed by id. A
    /// missing neighborhood gets all-zero dummies, sharing the baseline.
    #[default]
    Extended,
}

/// Fallback floor areas used when a listing has no size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeDefaults {
    /// Per-neighborhood median, used by [`FeatureSet::Extended`].
    pub area_medians: HashMap<String, f64>,
    /// Used by `Extended` for neighborhoods missing from the table.
    pub area_fallback: f64,
    /// Used by [`FeatureSet::Basic`] for every listing.
    pub basic_fallback: f64,
}

impl Default for SizeDefaults {
    fn default() -> Self {
        let area_medians = [
            ("Morningside Heights", 500.0),
            ("Hamilton Heights", 930.0),
            ("Upper West Side", 793.0),
            ("Manhattan Valley", 800.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            area_medians,
            area_fallback: 800.0,
            basic_fallback: 500.0,
        }
    }
}

/// Design matrix plus the key each row is reported under.
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrix {
    pub keys: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl FeatureMatrix {
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn select(&self, idx: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
        idx.iter()
            .map(|&i| (self.rows[i].clone(), self.targets[i]))
            .unzip()
    }
}

const UNKNOWN_AREA: &str = "Unknown";

/// The key a listing's prediction is joined back on, if it can be scored.
pub fn row_key(listing: &Listing, set: FeatureSet) -> Option<&str> {
    match set {
        FeatureSet::Basic => listing.title.as_deref(),
        FeatureSet::Extended => listing.id.as_deref(),
    }
}

fn measure_or(m: Option<&Measure>, missing: f64, unparsable: f64) -> f64 {
    match m {
        None => missing,
        Some(m) => m.as_f64().unwrap_or(unparsable),
    }
}

fn nonzero_or_one(v: f64) -> f64 {
    if v == 0.0 { 1.0 } else { v }
}

fn basic_numeric(listing: &Listing, sizes: &SizeDefaults) -> Vec<f64> {
    let bedrooms = match listing.bedrooms.as_ref() {
        Some(m) if m.text_lower().as_deref() == Some("studio") => 1.0,
        other => measure_or(other, 1.0, 1.0),
    };
    vec![
        nonzero_or_one(bedrooms),
        measure_or(listing.bathrooms.as_ref(), 1.0, 1.0),
        measure_or(listing.size_sqft.as_ref(), sizes.basic_fallback, 1.0),
    ]
}

fn extended_numeric(listing: &Listing, area: Option<&str>, sizes: &SizeDefaults) -> Vec<f64> {
    let area_size = area
        .and_then(|a| sizes.area_medians.get(a))
        .copied()
        .unwrap_or(sizes.area_fallback);
    let no_fee = matches!(listing.extra_field("no_fee"), Some(Value::Bool(true)));
    let is_studio = listing
        .extra_field("rooms_description")
        .and_then(Value::as_str)
        .is_some_and(|d| d.to_lowercase().contains("studio"));

    vec![
        nonzero_or_one(measure_or(listing.bedrooms.as_ref(), 1.0, 1.0)),
        measure_or(listing.bathrooms.as_ref(), 1.0, 1.0),
        measure_or(listing.size_sqft.as_ref(), area_size, area_size),
        f64::from(u8::from(no_fee)),
        f64::from(u8::from(is_studio)),
    ]
}

fn numeric_columns(set: FeatureSet) -> &'static [&'static str] {
    match set {
        FeatureSet::Basic => &["bedrooms", "bathrooms", "size_sqft"],
        FeatureSet::Extended => &["bedrooms", "bathrooms", "size_sqft", "no_fee", "is_studio"],
    }
}

/// The category a listing's neighborhood is encoded under. `None` means
/// no category at all.
fn area_category(listing: &Listing, set: FeatureSet) -> Option<&str> {
    match set {
        FeatureSet::Basic => Some(listing.area_name.as_deref().unwrap_or(UNKNOWN_AREA)),
        FeatureSet::Extended => listing.area_name.as_deref(),
    }
}

/// Builds the design matrix for every listing that has a key.
///
/// Neighborhoods are one-hot encoded in sorted order with the first category
/// dropped as the baseline.
pub fn build_features(listings: &[Listing], set: FeatureSet, sizes: &SizeDefaults) -> FeatureMatrix {
    let scorable: Vec<(&str, Option<&str>, &Listing)> = listings
        .iter()
        .filter_map(|l| row_key(l, set).map(|key| (key, area_category(l, set), l)))
        .collect();

    let categories: Vec<&str> = scorable
        .iter()
        .filter_map(|(_, area, _)| *area)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .skip(1)
        .collect();

    let mut matrix = FeatureMatrix {
        columns: numeric_columns(set)
            .iter()
            .map(|c| c.to_string())
            .chain(categories.iter().map(|c| format!("area_name_{c}")))
            .collect(),
        ..Default::default()
    };

    for (key, area, listing) in scorable {
        let mut row = match set {
            FeatureSet::Basic => basic_numeric(listing, sizes),
            FeatureSet::Extended => extended_numeric(listing, area, sizes),
        };
        row.extend(categories.iter().map(|c| f64::from(u8::from(Some(*c) == area))));

        matrix.keys.push(key.to_string());
        matrix.rows.push(row);
        matrix.targets.push(listing.price as f64);
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Marketplace;
    use crate::listing::fixtures::listing;
    use serde_json::json;

    fn with_area(street: &str, area: Option<&str>) -> Listing {
        let mut l = listing(Marketplace::StreetEasy, street, Some("1"), 3000);
        l.area_name = area.map(str::to_string);
        l
    }

    #[test]
    fn test_basic_defaults_and_studio() {
        let mut l = with_area("1 A St", Some("Harlem"));
        l.bedrooms = Some(Measure::Text(" Studio ".into()));
        l.bathrooms = Some(Measure::Text("\u{2014}".into()));
        l.size_sqft = None;

        let m = build_features(&[l], FeatureSet::Basic, &SizeDefaults::default());
        assert_eq!(m.rows[0], vec![1.0, 1.0, 500.0]);
        assert_eq!(m.keys[0], "1 A St 1");
    }

    #[test]
    fn test_basic_zero_bedrooms_become_one() {
        let mut l = with_area("1 A St", None);
        l.bedrooms = Some(Measure::from(0));
        l.size_sqft = Some(Measure::Text("n/a".into()));
        let m = build_features(&[l], FeatureSet::Basic, &SizeDefaults::default());
        assert_eq!(m.rows[0], vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_one_hot_drops_first_sorted_area() {
        let listings = vec![
            with_area("1 A St", Some("Upper West Side")),
            with_area("2 B St", None),
            with_area("3 C St", Some("Hamilton Heights")),
        ];
        let m = build_features(&listings, FeatureSet::Basic, &SizeDefaults::default());

        // sorted: Hamilton Heights (dropped), Unknown, Upper West Side
        assert_eq!(
            m.columns,
            vec![
                "bedrooms",
                "bathrooms",
                "size_sqft",
                "area_name_Unknown",
                "area_name_Upper West Side"
            ]
        );
        assert_eq!(&m.rows[0][3..], &[0.0, 1.0]);
        assert_eq!(&m.rows[1][3..], &[1.0, 0.0]);
        assert_eq!(&m.rows[2][3..], &[0.0, 0.0]);
    }

    #[test]
    fn test_extended_uses_ids_flags_and_area_medians() {
        let mut a = with_area("1 A St", Some("Hamilton Heights"));
        a.id = Some("7".into());
        a.extra.insert("no_fee".into(), json!(true));
        a.extra.insert("rooms_description".into(), json!("Studio, 1 bath"));

        let mut b = with_area("2 B St", Some("Inwood"));
        b.id = Some("8".into());
        b.extra.insert("no_fee".into(), json!("yes"));
        b.size_sqft = Some(Measure::from(610));

        let no_id = with_area("3 C St", None);

        let m = build_features(&[a, b, no_id], FeatureSet::Extended, &SizeDefaults::default());
        assert_eq!(m.keys, vec!["7", "8"]);
        assert_eq!(&m.rows[0][..5], &[1.0, 1.0, 930.0, 1.0, 1.0]);
        assert_eq!(&m.rows[1][..5], &[1.0, 1.0, 610.0, 0.0, 0.0]);
        assert_eq!(m.targets, vec![3000.0, 3000.0]);
    }

    #[test]
    fn test_extended_missing_area_shares_the_baseline() {
        let areas = [None, Some("Hamilton Heights"), Some("Upper West Side")];
        let listings: Vec<Listing> = areas
            .iter()
            .enumerate()
            .map(|(i, area)| {
                let mut l = with_area(&format!("{i} A St"), *area);
                l.id = Some(i.to_string());
                l
            })
            .collect();

        let m = build_features(&listings, FeatureSet::Extended, &SizeDefaults::default());
        assert_eq!(m.columns.len(), 6);
        assert_eq!(m.columns[5], "area_name_Upper West Side");
        assert_eq!(&m.rows[0][5..], &[0.0]);
        assert_eq!(&m.rows[1][5..], &[0.0]);
        assert_eq!(&m.rows[2][5..], &[1.0]);
        // no neighborhood falls back to the generic size
        assert_eq!(m.rows[0][2], 800.0);
    }

    #[test]
    fn test_basic_skips_untitled_listings() {
        let mut untitled = with_area("1 A St", None);
        untitled.title = None;
        let m = build_features(
            &[untitled, with_area("2 B St", None)],
            FeatureSet::Basic,
            &SizeDefaults::default(),
        );
        assert_eq!(m.keys, vec!["2 B St 1"]);
    }

    #[test]
    fn test_extended_unknown_area_uses_fallback() {
        let mut a = with_area("1 A St", Some("Inwood"));
        a.id = Some("1".into());
        let m = build_features(&[a], FeatureSet::Extended, &SizeDefaults::default());
        assert_eq!(m.rows[0][2], 800.0);
    }
}
