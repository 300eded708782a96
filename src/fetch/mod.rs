//! Page fetching boundary.
//!
//! The league site renders its tables client-side, so production deployments
//! usually point this at a rendering proxy that returns the final markup.
//! Everything behind [`PageSource`] is a collaborator; the pipeline only
//! needs "URL in, markup out".

use crate::Result;

/// Source of fully rendered page markup.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Attempts per page before the target is given up on.
const FETCH_ATTEMPTS: u32 = 3;

/// Plain HTTP page source backed by a blocking reqwest client.
pub struct HttpPageSource {
    client: reqwest::blocking::Client,
}

impl HttpPageSource {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent("rinkside/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        HttpPageSource { client }
    }

    fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(crate::RinksideError::Fetch(format!(
                "HTTP {}: {}",
                response.status(),
                url
            )));
        }

        Ok(response.text()?)
    }
}

impl Default for HttpPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<String> {
        log::info!("Fetching {}", url);
        let html = with_retry(|| self.fetch_once(url), FETCH_ATTEMPTS)?;
        log::debug!("Fetched {} characters from {}", html.len(), url);
        Ok(html)
    }
}

/// Retry a fetch operation with exponential backoff
pub fn with_retry<T, F>(mut operation: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_error = None;
    for attempt in 0..max_attempts {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                log::warn!("Attempt {} failed: {}", attempt + 1, e);
                last_error = Some(e);
                if attempt < max_attempts - 1 {
                    let delay = std::time::Duration::from_millis(100 * 2u64.pow(attempt));
                    std::thread::sleep(delay);
                }
            }
        }
    }
    Err(last_error.expect("at least one attempt"))
}
