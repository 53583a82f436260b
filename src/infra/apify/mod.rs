mod client;

pub use client::{ActorRun, ApifyClient, DEFAULT_BASE_URL, RunStatus, STREETEASY_ACTOR};
