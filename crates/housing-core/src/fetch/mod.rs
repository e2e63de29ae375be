use std::time::Duration;

use tracing::warn;

/// Attempts per URL before the source is declared unavailable for the run.
pub const MAX_ATTEMPTS: u32 = 3;
/// Fixed pause between attempts; no escalation.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Error raised once page retrieval gives up.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request for {url} failed after {attempts} attempt(s): {source}")]
    Exhausted {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("could not construct HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Seam over page retrieval so the pipeline can run against canned markup in
/// tests.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher: desktop user agent, per-call timeout, bounded
/// retries with a fixed backoff.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(err) if attempt < MAX_ATTEMPTS => {
                    warn!(url, attempt, error = %err, "fetch failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => {
                    return Err(FetchError::Exhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        source: err,
                    })
                }
            }
        }
    }
}
