//! Where the router statistics page comes from.

use reqwest::{
    Client as HttpClient,
    StatusCode,
};
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};

/// The statistics page could not be retrieved.
#[derive(thiserror::Error, Debug)]
pub enum StatsLookupError {
    #[error("unable to make the request to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response code of {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("unable to read the response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Supplies the raw statistics page.
pub trait DocumentSource {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<String, StatsLookupError>> + Send + '_>>;
}

/// Fetches the statistics page from the router over HTTP.
pub struct HttpDocumentSource {
    http_client: HttpClient,
    url: String,
    timeout: Duration,
}

impl HttpDocumentSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DocumentSource for HttpDocumentSource {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<String, StatsLookupError>> + Send + '_>> {
        Box::pin(async move {
            debug!(url = %self.url, "Fetching router stats");
            let response = self
                .http_client
                .get(&self.url)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|source| StatsLookupError::Request {
                    url: self.url.clone(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(StatsLookupError::Status {
                    url: self.url.clone(),
                    status,
                });
            }

            response.text().await.map_err(|source| StatsLookupError::Body {
                url: self.url.clone(),
                source,
            })
        })
    }
}
