use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::geocode::{MANHATTAN_NEIGHBORHOODS, MATCH_THRESHOLD, NeighborhoodMatcher};
use crate::infra::nominatim::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::scoring::features::SizeDefaults;

/// Tunables that would otherwise be hard-coded, loaded from an optional
/// JSON file. Every key is optional:
/// ```json
/// {
///   "match_threshold": 75,
///   "area_median_sqft": { "Inwood": 700 },
///   "geocoder": { "requests_per_second": 1, "timeout_secs": 20 }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub neighborhoods: Vec<String>,
    pub match_threshold: u8,
    pub area_median_sqft: HashMap<String, f64>,
    pub default_sqft: f64,
    pub basic_default_sqft: f64,
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub requests_per_second: NonZeroU32,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            requests_per_second: NonZeroU32::MIN,
            timeout_secs: 30,
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let sizes = SizeDefaults::default();
        Self {
            neighborhoods: MANHATTAN_NEIGHBORHOODS.iter().map(|s| s.to_string()).collect(),
            match_threshold: MATCH_THRESHOLD,
            area_median_sqft: sizes.area_medians,
            default_sqft: sizes.area_fallback,
            basic_default_sqft: sizes.basic_fallback,
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Built-in defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn size_defaults(&self) -> SizeDefaults {
        SizeDefaults {
            area_medians: self.area_median_sqft.clone(),
            area_fallback: self.default_sqft,
            basic_fallback: self.basic_default_sqft,
        }
    }

    pub fn matcher(&self) -> NeighborhoodMatcher {
        NeighborhoodMatcher::new(self.neighborhoods.clone(), self.match_threshold)
    }
}
