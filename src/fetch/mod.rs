mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, bail};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Sends `req` and returns the body, failing on non-2xx statuses with the
/// response text attached.
pub async fn send<C: HttpClient + ?Sized>(client: &C, req: Request) -> Result<Vec<u8>> {
    let method = req.method().clone();
    let url = req.url().clone();

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("{method} {} failed", redacted(&url)))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("{method} {} returned status {status}: {body}", redacted(&url));
    }
    Ok(resp.bytes().await?.to_vec())
}

pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: Url) -> Result<Vec<u8>> {
    send(client, Request::new(Method::GET, url)).await
}

/// GETs `url` and decodes the JSON body.
pub async fn get_json<C, T>(client: &C, url: Url) -> Result<T>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let bytes = fetch_bytes(client, url.clone()).await?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("unexpected response body from {}", redacted(&url)))
}

/// POSTs `body` as JSON to `url` and decodes the JSON reply.
pub async fn post_json<C, B, T>(client: &C, url: Url, body: &B) -> Result<T>
where
    C: HttpClient + ?Sized,
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut req = Request::new(Method::POST, url.clone());
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());

    let bytes = send(client, req).await?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("unexpected response body from {}", redacted(&url)))
}

/// URL without its query string, for log and error messages.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
