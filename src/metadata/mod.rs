pub mod html;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("page has no title")]
    MissingTitle,
}

/// Looks up the display title of a page.
///
/// Callers fall back to the url itself when this fails.
pub trait TitleFetcher {
    fn resolve_title(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches the page over HTTP and reads its `<title>`.
#[derive(Clone)]
pub struct HttpTitleFetcher {
    http: Client,
}

impl HttpTitleFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

impl TitleFetcher for HttpTitleFetcher {
    async fn resolve_title(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("Fetching title for {}", url);
        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = resp.text().await?;
        html::extract_title(&body).ok_or(FetchError::MissingTitle)
    }
}
