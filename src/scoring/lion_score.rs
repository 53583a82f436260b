use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical price-anomaly label derived from a regression residual.
///
/// | residual_pct | label                    |
/// |--------------|--------------------------|
/// | < -0.25      | 🚨 Too Cheap to Be True  |
/// | < -0.10      | 🔥 Steal Deal            |
/// | > 0.20       | 💸 Overpriced            |
/// | otherwise    | ✅ Reasonable            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LionScore {
    #[serde(rename = "🚨 Too Cheap to Be True")]
    TooCheap,
    #[serde(rename = "🔥 Steal Deal")]
    StealDeal,
    #[serde(rename = "✅ Reasonable")]
    Reasonable,
    #[serde(rename = "💸 Overpriced")]
    Overpriced,
}

impl LionScore {
    /// Buckets a residual percentage. NaN (a zero prediction over a zero
    /// price) falls through every comparison and lands on `Reasonable`.
    pub fn from_residual(pct: f64) -> Self {
        match pct {
            p if p < -0.25 => LionScore::TooCheap,
            p if p < -0.10 => LionScore::StealDeal,
            p if p > 0.20 => LionScore::Overpriced,
            _ => LionScore::Reasonable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LionScore::TooCheap => "🚨 Too Cheap to Be True",
            LionScore::StealDeal => "🔥 Steal Deal",
            LionScore::Reasonable => "✅ Reasonable",
            LionScore::Overpriced => "💸 Overpriced",
        }
    }
}

impl fmt::Display for LionScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `(actual - predicted) / predicted`
pub fn residual_pct(actual: f64, predicted: f64) -> f64 {
    (actual - predicted) / predicted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_boundaries() {
        assert_eq!(LionScore::from_residual(-0.50), LionScore::TooCheap);
        assert_eq!(LionScore::from_residual(-0.2501), LionScore::TooCheap);
        assert_eq!(LionScore::from_residual(-0.25), LionScore::StealDeal);
        assert_eq!(LionScore::from_residual(-0.11), LionScore::StealDeal);
        assert_eq!(LionScore::from_residual(-0.10), LionScore::Reasonable);
        assert_eq!(LionScore::from_residual(0.00), LionScore::Reasonable);
        assert_eq!(LionScore::from_residual(0.20), LionScore::Reasonable);
        assert_eq!(LionScore::from_residual(0.2001), LionScore::Overpriced);
        assert_eq!(LionScore::from_residual(f64::NAN), LionScore::Reasonable);
        assert_eq!(LionScore::from_residual(f64::INFINITY), LionScore::Overpriced);
    }

    #[test]
    fn test_residual_pct() {
        assert_eq!(residual_pct(1500.0, 2000.0), -0.25);
        assert_eq!(residual_pct(2400.0, 2000.0), 0.2);
    }

    #[test]
    fn test_label_matches_serialized_form() {
        for score in [
            LionScore::TooCheap,
            LionScore::StealDeal,
            LionScore::Reasonable,
            LionScore::Overpriced,
        ] {
            let json = serde_json::to_string(&score).unwrap();
            assert_eq!(json, format!("\"{}\"", score.label()));
        }
    }
}
