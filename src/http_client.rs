use std::time::Duration;

use anyhow::{Context, Result, bail};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL};

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("arena_terminal/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")
    })
}

/// GETs `url` and returns the body. Non-success statuses are errors.
pub fn get_text(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .header(ACCEPT, "application/json")
        .header(CACHE_CONTROL, "no-store")
        .send()
        .with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("HTTP {} for {url}", status.as_u16());
    }
    resp.text()
        .with_context(|| format!("failed to read body: {url}"))
}
