pub mod combine;
pub mod config;
pub mod de;
pub mod dedupe;
pub mod fetch;
pub mod geocode;
pub mod ids;
pub mod infra;
pub mod listing;
pub mod output;
pub mod scoring;
pub mod services;
pub mod sources;
pub mod stats;
