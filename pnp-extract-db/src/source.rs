//! Remote catalog sources.
//!
//! The cache only needs one capability from the network: fetch a route,
//! optionally conditional on the data having changed since a given time.
//! [`NetrunnerDbClient`] provides it over blocking HTTP.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED};

use crate::error::DbError;
use crate::route::CacheKey;

/// <https://netrunnerdb.com/api/doc>
pub const DEFAULT_HOST: &str = "https://netrunnerdb.com/api/2.0/public/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a source answered for one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceResponse {
    /// Fresh data, with the upstream modification time if the server sent one.
    Success {
        body: String,
        last_modified: Option<DateTime<Utc>>,
    },
    /// The data has not changed since the time passed to [`Source::fetch`].
    NotModified,
    /// The route or id does not exist upstream.
    NotFound,
}

/// A remote catalog. Transport failures are returned as `Err`.
pub trait Source {
    fn fetch(
        &self,
        key: &CacheKey,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<SourceResponse, DbError>;
}

/// Blocking HTTP client for the NetrunnerDB public API.
pub struct NetrunnerDbClient {
    http: reqwest::blocking::Client,
    host: String,
}

impl NetrunnerDbClient {
    pub fn new(host: impl Into<String>) -> Result<Self, DbError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pnp-extract/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            host: host.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Full URL of a route, e.g. `https://netrunnerdb.com/api/2.0/public/pack/core`.
    pub fn url(&self, key: &CacheKey) -> String {
        format!("{}/{key}", self.host.trim_end_matches('/'))
    }
}

impl Source for NetrunnerDbClient {
    fn fetch(
        &self,
        key: &CacheKey,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<SourceResponse, DbError> {
        let url = self.url(key);
        match modified_since {
            Some(since) => log::info!("GET {url} (modified_since: {since})"),
            None => log::info!("GET {url}"),
        }

        let mut request = self.http.get(&url);
        if let Some(since) = modified_since {
            request = request.header(IF_MODIFIED_SINCE, format_http_date(since));
        }

        let response = request.send()?;
        let status = response.status();
        log::debug!(" -> {status}");

        if status == StatusCode::NOT_MODIFIED {
            return Ok(SourceResponse::NotModified);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(SourceResponse::NotFound);
        }
        if !status.is_success() {
            return Err(DbError::ServerError {
                status: status.as_u16(),
                url,
            });
        }

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date);
        let body = response.text()?;

        Ok(SourceResponse::Success {
            body,
            last_modified,
        })
    }
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date header value.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
