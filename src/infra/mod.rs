//! Clients for the third-party HTTP services the pipeline talks to.

pub mod apify;
pub mod nominatim;
