//! Mock fetcher for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::sources::{FetchError, SourceFetcher};

#[derive(Debug, Clone)]
enum MockResponse {
    Body { text: String, delay: Option<Duration> },
    Error(FetchError),
}

/// Mock implementation of the SourceFetcher trait.
///
/// URLs without a configured response fail with HTTP 404.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn respond(&self, url: &str, body: &str) {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            MockResponse::Body {
                text: body.to_string(),
                delay: None,
            },
        );
    }

    /// Serve `body` for `url` after sleeping for `delay`.
    pub fn respond_after(&self, url: &str, body: &str, delay: Duration) {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            MockResponse::Body {
                text: body.to_string(),
                delay: Some(delay),
            },
        );
    }

    /// Fail every fetch of `url` with `error`.
    pub fn fail(&self, url: &str, error: FetchError) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), MockResponse::Error(error));
    }

    /// URLs fetched so far, in request order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let response = self.responses.lock().unwrap().get(url).cloned();

        match response {
            Some(MockResponse::Body { text, delay }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(text)
            }
            Some(MockResponse::Error(e)) => Err(e),
            None => Err(FetchError::HttpStatus(404)),
        }
    }
}
