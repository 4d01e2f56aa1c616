/*
[INPUT]:  HTTP configuration (timeouts, user agent) and feed locations
[OUTPUT]: Configured reqwest client opening http, file, and stdin feeds
[POS]:    Transport layer - default FeedTransport implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info};

use super::error::Result;
use super::transport::{FeedLocation, FeedResponse, FeedTransport};
use crate::stream::{ByteSource, ReaderSource};

const DEFAULT_USER_AGENT: &str = concat!("logview/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Total request timeout. `None` lets a stream run until the server ends it.
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Default feed transport: reqwest for http(s), tokio for files and stdin.
#[derive(Debug, Clone)]
pub struct LogviewClient {
    http_client: Client,
}

impl LogviewClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
        })
    }
}

#[async_trait]
impl FeedTransport for LogviewClient {
    async fn open(&self, location: &FeedLocation) -> Result<FeedResponse> {
        match location {
            FeedLocation::Http(url) => {
                debug!(url = %url, "opening http feed");
                let response = self.http_client.get(url.clone()).send().await?;
                let status = response.status();
                info!(url = %url, status = status.as_u16(), "feed response received");

                let body: Option<Box<dyn ByteSource>> = if carries_body(status) {
                    Some(Box::new(ResponseSource::new(response)))
                } else {
                    None
                };
                Ok(FeedResponse::new(status, body))
            }
            FeedLocation::File(path) => {
                debug!(path = %path.display(), "opening file feed");
                let file = tokio::fs::File::open(path).await?;
                Ok(FeedResponse::ok(ReaderSource::new(file)))
            }
            FeedLocation::Stdin => {
                debug!("opening stdin feed");
                Ok(FeedResponse::ok(ReaderSource::new(tokio::io::stdin())))
            }
        }
    }
}

fn carries_body(status: StatusCode) -> bool {
    !matches!(
        status,
        StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
    )
}

/// Byte source over a streaming reqwest response body.
#[derive(Debug)]
pub struct ResponseSource {
    response: Response,
}

impl ResponseSource {
    pub fn new(response: Response) -> Self {
        Self { response }
    }
}

#[async_trait]
impl ByteSource for ResponseSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.response.chunk().await?)
    }
}
