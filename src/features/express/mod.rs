//! Image API client for the express commands
//!
//! Thin proxy over a `GET {base}/{endpoint}` API returning `{"url": "..."}`.
//! Both the SFW and NSFW bases are configurable.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.5.0

use std::time::Duration;

use anyhow::{anyhow, Context as _, Result};
use serde::Deserialize;
use tokio::time::timeout;

/// Default SFW API base.
pub const DEFAULT_SFW_BASE: &str = "https://api.waifu.pics/sfw";
/// Default NSFW API base.
pub const DEFAULT_NSFW_BASE: &str = "https://api.waifu.pics/nsfw";

/// Endpoints served by the express commands (`/neko` and friends).
pub const SFW_ENDPOINTS: &[&str] = &["neko", "hug", "pat"];

/// Categories for `/nsfw`; a random one is picked when the user names none.
pub const NSFW_ENDPOINTS: &[&str] = &["waifu", "neko", "trap", "blowjob"];

/// HTTP request timeout for the image API.
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Deserialize)]
struct ImageResponse {
    url: String,
}

/// Cheap-to-clone client for the image APIs.
#[derive(Clone)]
pub struct ExpressClient {
    http: reqwest::Client,
    sfw_base: String,
    nsfw_base: String,
}

impl ExpressClient {
    pub fn new(sfw_base: impl Into<String>, nsfw_base: impl Into<String>) -> Self {
        ExpressClient {
            http: reqwest::Client::new(),
            sfw_base: trim_base(sfw_base.into()),
            nsfw_base: trim_base(nsfw_base.into()),
        }
    }

    /// Fetch an image URL from the SFW API.
    pub async fn fetch_sfw(&self, endpoint: &str) -> Result<String> {
        self.fetch(&self.sfw_base, endpoint).await
    }

    /// Fetch an image URL from the NSFW API.
    pub async fn fetch_nsfw(&self, endpoint: &str) -> Result<String> {
        self.fetch(&self.nsfw_base, endpoint).await
    }

    async fn fetch(&self, base: &str, endpoint: &str) -> Result<String> {
        let url = format!("{base}/{endpoint}");
        let response = timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            self.http.get(&url).send(),
        )
        .await
        .map_err(|_| anyhow!("image API timed out after {REQUEST_TIMEOUT_SECS}s"))?
        .with_context(|| format!("request to {url} failed"))?;

        let response = response
            .error_for_status()
            .with_context(|| format!("image API rejected {url}"))?;

        let body: ImageResponse = response
            .json()
            .await
            .with_context(|| format!("unexpected payload from {url}"))?;
        Ok(body.url)
    }
}

impl Default for ExpressClient {
    fn default() -> Self {
        Self::new(DEFAULT_SFW_BASE, DEFAULT_NSFW_BASE)
    }
}

fn trim_base(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_strips_trailing_slashes() {
        assert_eq!(trim_base("https://x/api/".to_string()), "https://x/api");
        assert_eq!(trim_base("https://x/api//".to_string()), "https://x/api");
        assert_eq!(trim_base("https://x/api".to_string()), "https://x/api");
    }

    #[test]
    fn test_endpoint_tables_are_nonempty() {
        assert!(!SFW_ENDPOINTS.is_empty());
        assert!(!NSFW_ENDPOINTS.is_empty());
    }

    #[test]
    fn test_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<ExpressClient>();
    }
}
