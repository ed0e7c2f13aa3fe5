//! Network access for feeds and search pages.
//!
//! The pipeline only ever needs "give me the body at this URL", so that is
//! all the [`FetchText`] trait offers. [`HttpFetcher`] implements it over
//! `reqwest` with a per-request timeout; tests substitute an in-memory map.

use reqwest::Client;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Trait for retrieving a document as text.
pub trait FetchText {
    /// Fetch `url` and return its body.
    ///
    /// Non-success HTTP statuses and timeouts are errors.
    async fn fetch_text(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// [`FetchText`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client whose every request gives up after `timeout`.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchText for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = async {
            let body = self
                .client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            Ok::<_, reqwest::Error>(body)
        }
        .await;
        let dt = t0.elapsed();

        match res {
            Ok(body) => {
                debug!(elapsed_ms = dt.as_millis() as u64, bytes = body.len(), "Fetched document");
                Ok(body)
            }
            Err(e) => {
                warn!(
                    elapsed_ms = dt.as_millis() as u64,
                    timeout = e.is_timeout(),
                    status = ?e.status(),
                    error = %e,
                    "Request failed"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
pub mod fake {
    //! In-memory [`FetchText`] for tests.

    use super::FetchText;
    use std::collections::HashMap;
    use std::error::Error;

    #[derive(Debug, Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, String>,
    }

    impl FakeFetcher {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl FetchText for FakeFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, Box<dyn Error>> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| format!("no route to {url}").into())
        }
    }
}
