use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

use crate::fallback::FallbackDataset;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/analytics";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Process-lifetime settings handed to the coordinator and the report requester.
#[derive(Debug, Clone)]
pub struct Config {
    /// Always ends with `/` so category paths join beneath it.
    pub api_base: Url,
    /// Network-stack timeout for the HTTP transport; `None` leaves it unbounded.
    pub http_timeout: Option<Duration>,
    pub fallback: FallbackDataset,
}

impl Config {
    pub fn new(api_base: &str) -> Result<Self> {
        Ok(Self {
            api_base: normalize_base(api_base)?,
            http_timeout: Some(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
            fallback: FallbackDataset::standard(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let base = std::env::var("DASHBOARD_API").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let mut cfg = Self::new(&base)?;
        cfg.http_timeout = timeout_from(std::env::var("HTTP_TIMEOUT_SECS").ok().as_deref());
        Ok(cfg)
    }
}

/// `0` disables the timeout; missing or unparsable values mean the default.
fn timeout_from(raw: Option<&str>) -> Option<Duration> {
    let secs = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid api base url: {raw}"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("api base url cannot carry paths: {raw}");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
