//! HTTP client speaking the SPARQL 1.1 protocol.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::sparql::{QueryError, QueryResults, Row, SparqlTransport};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// HTTP client with a politeness delay after every request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_delay: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(timeout: Duration, request_delay: Duration) -> Result<Self, QueryError> {
        Self::with_user_agent(timeout, request_delay, None)
    }

    /// Create a new HTTP client with a custom user agent.
    pub fn with_user_agent(
        timeout: Duration,
        request_delay: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, QueryError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            request_delay,
        })
    }

    /// Send a request, then wait out the request delay whatever the outcome.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, QueryError> {
        let start = Instant::now();
        let result = request.send().await;
        debug!("GET {} took {}ms", url, start.elapsed().as_millis());

        tokio::time::sleep(self.request_delay).await;

        Ok(result?.error_for_status()?)
    }
}

/// Parse a SPARQL JSON results document into rows.
pub fn parse_results(body: &str) -> Result<Vec<Row>, QueryError> {
    serde_json::from_str::<QueryResults>(body)
        .map_err(|e| QueryError::Malformed(e.to_string()))?
        .into_rows()
        .ok_or_else(|| QueryError::Malformed("neither bindings nor boolean".to_string()))
}

#[async_trait]
impl SparqlTransport for HttpClient {
    async fn select(
        &self,
        endpoint: &str,
        query: &str,
        timeout: Option<Duration>,
    ) -> Result<Vec<Row>, QueryError> {
        let mut request = self
            .client
            .get(endpoint)
            .query(&[("query", query)])
            .header(ACCEPT, SPARQL_RESULTS_JSON);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = self.send(request, endpoint).await?;
        let body = response.text().await?;
        parse_results(&body)
    }

    async fn get_text(&self, url: &str) -> Result<String, QueryError> {
        let response = self.send(self.client.get(url), url).await?;
        Ok(response.text().await?)
    }
}
