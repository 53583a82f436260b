use async_trait::async_trait;
use reqwest::{Request, Response};

/// The single seam every outbound request goes through, so API clients can
/// be wrapped (auth) or replaced with canned responses in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
