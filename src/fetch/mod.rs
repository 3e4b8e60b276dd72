//! Retrieval of the raw feed document.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, Request, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info};

/// Why a feed could not be turned into station records.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Invalid feed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to retrieve data from {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to retrieve data from {url}: HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to read feed file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing XML: {0}")]
    Xml(String),
}

/// Builds the `GET` request for the feed, asking for XML.
pub fn feed_request(url: &str) -> Result<Request, FeedError> {
    let parsed = Url::parse(url).map_err(|e| FeedError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let mut req = Request::new(Method::GET, parsed);
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/xml"));
    Ok(req)
}

fn check_status(url: &str, status: StatusCode) -> Result<(), FeedError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FeedError::Status {
            url: url.to_string(),
            status,
        })
    }
}

/// Fetches the feed body over HTTP. Any non-success status is an error.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, FeedError> {
    let req = feed_request(url)?;
    let request_error = |source| FeedError::Request {
        url: url.to_string(),
        source,
    };

    let resp = client.execute(req).await.map_err(request_error)?;
    check_status(url, resp.status())?;
    let bytes = resp.bytes().await.map_err(request_error)?;

    debug!(bytes = bytes.len(), "Feed bytes received");
    Ok(bytes.to_vec())
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(client))]
pub async fn load_feed<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>, FeedError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return fetch_bytes(client, source).await;
    }

    info!("Reading feed from local file");
    tokio::fs::read(source).await.map_err(|source_err| FeedError::Read {
        path: source.to_string(),
        source: source_err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_feed_request_asks_for_xml() {
        let req = feed_request("https://airquality.cpcb.gov.in/caaqms/rss_feed").unwrap();
        assert_eq!(*req.method(), Method::GET);
        assert_eq!(req.headers()[ACCEPT], "application/xml");
        assert_eq!(req.url().path(), "/caaqms/rss_feed");
    }

    #[test]
    fn test_feed_request_rejects_bad_url() {
        assert!(matches!(
            feed_request("not a url"),
            Err(FeedError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("u", StatusCode::OK).is_ok());
        let err = check_status("u", StatusCode::SERVICE_UNAVAILABLE).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to retrieve data from u: HTTP 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_load_feed_from_file() {
        let path = env::temp_dir().join("aqi_mapper_test_feed.xml");
        fs::write(&path, "<AqIndex/>").unwrap();

        let client = BasicClient::new().unwrap();
        let bytes = load_feed(&client, path.to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, b"<AqIndex/>");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_feed_missing_file() {
        let client = BasicClient::new().unwrap();
        let result = load_feed(&client, "/nonexistent/aqi_mapper/feed.xml").await;
        assert!(matches!(result, Err(FeedError::Read { .. })));
    }
}
