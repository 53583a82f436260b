use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dedupe::DedupCounts;
use crate::listing::{Listing, Marketplace};
use crate::scoring::lion_score::LionScore;

/// Summary of one `combine` run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CombineStats {
    pub timestamp: DateTime<Utc>,

    // input records per source
    pub compass_records: usize,
    pub renthop_records: usize,
    pub streeteasy_records: usize,

    // dedup outcome
    pub rejected: usize,
    pub standalone: usize,
    pub inserted: usize,
    pub merged: usize,

    // output
    pub unique: usize,
    pub multi_marketplace: usize,
    pub outside_streeteasy: usize,
}

impl CombineStats {
    pub fn from_run(inputs: [usize; 3], counts: DedupCounts, output: &[Listing]) -> Self {
        let [compass_records, renthop_records, streeteasy_records] = inputs;
        CombineStats {
            timestamp: Utc::now(),
            compass_records,
            renthop_records,
            streeteasy_records,
            rejected: counts.rejected,
            standalone: counts.standalone,
            inserted: counts.inserted,
            merged: counts.merged,
            unique: output.len(),
            multi_marketplace: output.iter().filter(|l| l.marketplace.len() > 1).count(),
            outside_streeteasy: output
                .iter()
                .filter(|l| !l.marketplace.contains(&Marketplace::StreetEasy))
                .count(),
        }
    }

    pub fn total_records(&self) -> usize {
        self.compass_records + self.renthop_records + self.streeteasy_records
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn rejected_pct(&self) -> f64 {
        Self::pct(self.rejected, self.total_records())
    }
}

/// Summary of one `score` run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScoreStats {
    pub timestamp: DateTime<Utc>,
    pub rows_trained: usize,
    pub features: usize,
    pub listings_labeled: usize,

    // label counts
    pub too_cheap: usize,
    pub steal_deal: usize,
    pub reasonable: usize,
    pub overpriced: usize,

    pub mean_residual_pct: f64,
    pub stddev_residual_pct: f64,
}

impl ScoreStats {
    pub fn count(&mut self, score: LionScore) {
        match score {
            LionScore::TooCheap => self.too_cheap += 1,
            LionScore::StealDeal => self.steal_deal += 1,
            LionScore::Reasonable => self.reasonable += 1,
            LionScore::Overpriced => self.overpriced += 1,
        }
    }

    pub fn flagged(&self) -> usize {
        self.too_cheap + self.steal_deal + self.overpriced
    }
}
