/*
[INPUT]:  Raw feed location strings and transport implementations
[OUTPUT]: FeedLocation parsing, FeedResponse status/body checks, FeedTransport trait
[POS]:    Transport layer - feed opening contract
[UPDATE]: When adding feed schemes or fatal open conditions
*/

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use super::error::{LogviewError, Result};
use crate::stream::{ByteSource, NdjsonDecoder};

/// Where a feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    /// `http://` or `https://` URL
    Http(Url),
    /// `file://` URL or bare filesystem path
    File(PathBuf),
    /// `-`
    Stdin,
}

impl FeedLocation {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LogviewError::Config("feed location is empty".to_string()));
        }
        if raw == "-" {
            return Ok(FeedLocation::Stdin);
        }

        match Url::parse(raw) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(FeedLocation::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(FeedLocation::File)
                    .map_err(|_| LogviewError::Config(format!("invalid file URL: {raw}"))),
                other => Err(LogviewError::UnsupportedScheme(other.to_string())),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(FeedLocation::File(raw.into())),
            Err(err) => Err(err.into()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, FeedLocation::Http(_))
    }
}

impl FromStr for FeedLocation {
    type Err = LogviewError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedLocation::Http(url) => write!(f, "{url}"),
            FeedLocation::File(path) => write!(f, "{}", path.display()),
            FeedLocation::Stdin => f.write_str("-"),
        }
    }
}

/// Result of opening a feed: a status plus an optional body.
pub struct FeedResponse {
    status: StatusCode,
    body: Option<Box<dyn ByteSource>>,
}

impl FeedResponse {
    pub fn new(status: StatusCode, body: Option<Box<dyn ByteSource>>) -> Self {
        Self { status, body }
    }

    /// Successful response with a body.
    pub fn ok(body: impl ByteSource + 'static) -> Self {
        Self::new(StatusCode::OK, Some(Box::new(body)))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Take the body, failing on a non-success status first, then on a missing body.
    pub fn into_body(self) -> Result<Box<dyn ByteSource>> {
        if !self.status.is_success() {
            return Err(LogviewError::status_error(self.status));
        }
        self.body.ok_or(LogviewError::MissingBody)
    }
}

impl fmt::Debug for FeedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedResponse")
            .field("status", &self.status)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Opens feeds. Injected into the feed controller so tests can script responses.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn open(&self, location: &FeedLocation) -> Result<FeedResponse>;

    /// Open a feed and wrap its body in an NDJSON decoder.
    async fn open_records(
        &self,
        location: &FeedLocation,
    ) -> Result<NdjsonDecoder<Box<dyn ByteSource>>> {
        let response = self.open(location).await?;
        Ok(NdjsonDecoder::new(response.into_body()?))
    }
}

#[async_trait]
impl<T: FeedTransport + ?Sized> FeedTransport for Arc<T> {
    async fn open(&self, location: &FeedLocation) -> Result<FeedResponse> {
        (**self).open(location).await
    }
}
