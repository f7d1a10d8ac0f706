//! Remote entry retrieval.
//!
//! Bundle entries written as absolute URLs are fetched over HTTP. The core
//! only needs "URL in, text out", so retrieval sits behind [`Fetcher`] and
//! tests substitute an in-memory implementation.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::FetchConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to `{url}` failed")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{url}` answered with status {status}")]
    Status { url: Url, status: u16 },

    #[error("{0}")]
    Other(String),
}

/// Retrieves the text content of a remote entry.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Self::with_timeout(config.timeout(), &config.user_agent)
    }

    pub fn with_timeout(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Other(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(request_error)?;

        // Anything but 200 is a failure, redirects are followed by the client
        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        response.text().map_err(request_error)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticFetcher;
    use super::*;

    #[test]
    fn test_http_fetcher_builds_from_config() {
        assert!(HttpFetcher::new(&FetchConfig::default()).is_ok());
    }

    #[test]
    fn test_static_fetcher_counts_requests() {
        let fetcher = StaticFetcher::new().with("https://cdn.example.com/a.js", "var a;");
        let url = Url::parse("https://cdn.example.com/a.js").unwrap();
        assert_eq!(fetcher.fetch(&url).unwrap(), "var a;");

        let missing = Url::parse("https://cdn.example.com/b.js").unwrap();
        let err = fetcher.fetch(&missing).unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(fetcher.requests(), 2);
    }

    #[test]
    fn test_status_error_display() {
        let err = FetchError::Status {
            url: Url::parse("https://example.com/x.css").unwrap(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "`https://example.com/x.css` answered with status 503"
        );
    }
}
