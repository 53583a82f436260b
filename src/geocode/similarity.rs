//! Fuzzy string similarity on a 0–100 scale.
//!
//! [`weighted_ratio`] blends whole-string, partial, token-sort and token-set
//! comparisons, so "Morningside Hts" still scores highly against
//! "Morningside" while unrelated names stay low. Every comparison is built
//! on normalized Levenshtein similarity.

use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;

/// Lower-cases and replaces every non-alphanumeric character with a space.
pub fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Whole-string similarity. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    100.0 * strsim::normalized_levenshtein(a, b)
}

/// Best [`ratio`] of the shorter string against every equally long window
/// of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let long_chars: Vec<char> = long.chars().collect();
    let width = short.chars().count();
    if width == 0 {
        return 0.0;
    }
    if width == long_chars.len() {
        return ratio(short, long);
    }

    long_chars
        .windows(width)
        .map(|w| ratio(short, &w.iter().collect::<String>()))
        .fold(0.0, f64::max)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort(a: &str, b: &str, partial: bool) -> f64 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    if partial {
        partial_ratio(&a, &b)
    } else {
        ratio(&a, &b)
    }
}

fn token_set(a: &str, b: &str, partial: bool) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: Vec<&str>| set.join(" ");
    let sect = join(ta.intersection(&tb).copied().collect());
    let a_only = join(ta.difference(&tb).copied().collect());
    let b_only = join(tb.difference(&ta).copied().collect());

    let combined_a = format!("{sect} {a_only}").trim().to_string();
    let combined_b = format!("{sect} {b_only}").trim().to_string();

    let score = |x: &str, y: &str| if partial { partial_ratio(x, y) } else { ratio(x, y) };
    [
        score(&sect, &combined_a),
        score(&sect, &combined_b),
        score(&combined_a, &combined_b),
    ]
    .into_iter()
    .fold(0.0, f64::max)
}

/// Blended similarity of two raw strings, rounded to 0–100.
///
/// Partial comparisons are only considered when one string is at least 1.5×
/// the other, and are discounted (more so past 8×).
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let (p1, p2) = (normalize(a), normalize(b));
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let base = ratio(&p1, &p2);
    let (l1, l2) = (p1.chars().count() as f64, p2.chars().count() as f64);
    let len_ratio = l1.max(l2) / l1.min(l2);

    let best = if len_ratio < 1.5 {
        base.max(token_sort(&p1, &p2, false) * UNBASE_SCALE)
            .max(token_set(&p1, &p2, false) * UNBASE_SCALE)
    } else {
        let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
        base.max(partial_ratio(&p1, &p2) * partial_scale)
            .max(token_sort(&p1, &p2, true) * UNBASE_SCALE * partial_scale)
            .max(token_set(&p1, &p2, true) * UNBASE_SCALE * partial_scale)
    };

    best.round().clamp(0.0, 100.0) as u8
}
