//! Transport abstraction for talking to SPARQL endpoints.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::results::Row;

/// Errors from a single query attempt.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Empty result set")]
    Empty,

    #[error("Unexpected result shape: {0}")]
    Interpret(String),

    #[error("No query variants to try")]
    NoVariants,
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            QueryError::Timeout
        } else if let Some(status) = e.status() {
            QueryError::Status {
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            QueryError::Malformed(e.to_string())
        } else {
            QueryError::Transport(e.to_string())
        }
    }
}

/// Network access used by the prober and the importer.
#[async_trait]
pub trait SparqlTransport: Send + Sync {
    /// Run one query against an endpoint and return its result rows.
    async fn select(
        &self,
        endpoint: &str,
        query: &str,
        timeout: Option<Duration>,
    ) -> Result<Vec<Row>, QueryError>;

    /// Fetch a document over plain HTTP GET (landing pages, manifests).
    async fn get_text(&self, url: &str) -> Result<String, QueryError>;
}
