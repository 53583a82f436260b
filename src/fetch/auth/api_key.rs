use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// The header is validated once at construction so a malformed token fails
/// before any request is attempted.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .with_context(|| format!("invalid header name {header_name:?}"))?;
        let mut value = HeaderValue::from_str(key).context("API key is not a valid header value")?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// `Authorization: Bearer <key>`, the scheme the actor platform expects.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        Self::new(inner, AUTHORIZATION.as_str(), &format!("Bearer {key}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::CannedClient;

    #[tokio::test]
    async fn test_bearer_header_is_injected() {
        let client = ApiKey::bearer(CannedClient::new(vec![(200, "[]")]), "tok123").unwrap();
        let req = reqwest::Request::new(
            reqwest::Method::GET,
            "https://api.example.com/v2/x".parse().unwrap(),
        );
        client.execute(req).await.unwrap();

        let seen = client.inner.requests();
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok123"));
    }

    #[test]
    fn test_bad_key_is_rejected_up_front() {
        assert!(ApiKey::bearer(CannedClient::new(vec![]), "line\nbreak").is_err());
    }
}
