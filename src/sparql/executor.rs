//! Query execution against a single endpoint.

use std::time::Duration;

use tracing::warn;

use super::ladder::first_success;
use super::queries::{CountLadder, HistogramLadder, QueryVariant, Reading};
use super::results::{first_integer, integer_binding, Row};
use super::transport::{QueryError, SparqlTransport};
use crate::models::{Histogram, InstanceCount, Metric};

/// Runs queries against one endpoint with an optional per-request timeout.
pub struct QueryExecutor<'a> {
    transport: &'a dyn SparqlTransport,
    endpoint: String,
    timeout: Option<Duration>,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(transport: &'a dyn SparqlTransport, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    /// Timeout applied to every later query.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// One round-trip to the endpoint.
    pub async fn execute(&self, query: &str) -> Result<Vec<Row>, QueryError> {
        self.transport
            .select(&self.endpoint, query, self.timeout)
            .await
    }

    /// Run a count ladder. Every failure collapses into `Metric::Unknown`.
    pub async fn count(&self, ladder: &CountLadder) -> Metric {
        match first_success(self, ladder.metric, &ladder.variants, read_count).await {
            Ok(metric) => metric,
            Err(e) => {
                warn!(
                    "Could not determine {} for {}: {}",
                    ladder.metric, self.endpoint, e
                );
                Metric::Unknown
            }
        }
    }

    /// Run a histogram ladder, returning the histogram and its length.
    ///
    /// Empty rungs fail like any other, so an endpoint that answers every
    /// grouped query with nothing yields `Unknown`.
    pub async fn histogram(&self, ladder: &HistogramLadder) -> (Histogram, Metric) {
        let result = first_success(self, ladder.metric, &ladder.variants, |variant, rows| {
            read_histogram(ladder, variant, rows)
        })
        .await;

        match result {
            Ok((entries, metric)) => (Histogram::Counted(entries), metric),
            Err(e) => {
                warn!(
                    "Could not determine {} for {}: {}",
                    ladder.metric, self.endpoint, e
                );
                (Histogram::Unknown, Metric::Unknown)
            }
        }
    }
}

fn read_count(variant: &QueryVariant, rows: Vec<Row>) -> Result<Metric, QueryError> {
    match variant.reading {
        Reading::Aggregate { var } => {
            let row = rows.first().ok_or(QueryError::Empty)?;
            integer_binding(row, var)
                .or_else(|| first_integer(row))
                .map(Metric::Valid)
                .ok_or_else(|| QueryError::Interpret(format!("no integer bound to ?{}", var)))
        }
        Reading::RowCount => Ok(Metric::from_row_count(rows.len() as u64, variant.limit)),
    }
}

fn read_histogram(
    ladder: &HistogramLadder,
    variant: &QueryVariant,
    rows: Vec<Row>,
) -> Result<(Vec<InstanceCount>, Metric), QueryError> {
    let count = Metric::from_row_count(rows.len() as u64, variant.limit);
    let entries = rows
        .iter()
        .map(|row| {
            let name = row
                .get(ladder.name_var)
                .map(|term| term.value.clone())
                .ok_or_else(|| QueryError::Interpret(format!("?{} unbound", ladder.name_var)))?;
            let amount = integer_binding(row, ladder.amount_var).ok_or_else(|| {
                QueryError::Interpret(format!("no integer bound to ?{}", ladder.amount_var))
            })?;
            Ok(InstanceCount { name, amount })
        })
        .collect::<Result<Vec<_>, QueryError>>()?;
    Ok((entries, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::mock::{count_row, histogram_rows, rows_of, Scripted, ScriptedTransport};
    use crate::sparql::queries;

    #[tokio::test]
    async fn test_count_uses_aggregate_first() {
        let transport = ScriptedTransport::new()
            .on("COUNT(*)", Scripted::Rows(vec![count_row("triplesAmount", 1234)]));
        let executor = QueryExecutor::new(&transport, "http://x/sparql");
        assert_eq!(executor.count(&queries::triples()).await, Metric::Valid(1234));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_count_third_rung_after_two_failures() {
        let transport = ScriptedTransport::new()
            .on("LIMIT 10000", Scripted::Rows(rows_of("s", 3)))
            .on("SELECT", Scripted::Fail("boom".to_string()));
        let executor = QueryExecutor::new(&transport, "http://x/sparql");
        assert_eq!(executor.count(&queries::triples()).await, Metric::Valid(3));
    }

    #[tokio::test]
    async fn test_count_all_rungs_fail_is_unknown() {
        let transport = ScriptedTransport::new().on("SELECT", Scripted::Fail("down".to_string()));
        let executor = QueryExecutor::new(&transport, "http://x/sparql");
        let metric = executor.count(&queries::triples()).await;
        assert_eq!(metric, Metric::Unknown);
        assert_eq!(metric.as_legacy_number(), -1);
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_limited_listing_saturates() {
        let transport = ScriptedTransport::new()
            .on("LIMIT 10000", Scripted::Rows(rows_of("s", 10_000)))
            .on("SELECT", Scripted::Fail("too big".to_string()));
        let executor = QueryExecutor::new(&transport, "http://x/sparql");
        assert_eq!(
            executor.count(&queries::instances()).await,
            Metric::Saturated(10_000)
        );
    }

    #[tokio::test]
    async fn test_aggregate_without_number_falls_back() {
        let transport = ScriptedTransport::new()
            .on("COUNT(", Scripted::Rows(rows_of("s", 1)))
            .on("SELECT DISTINCT ?s", Scripted::Rows(rows_of("s", 7)));
        let executor = QueryExecutor::new(&transport, "http://x/sparql");
        // rows_of binds IRIs, which are not integers
        assert_eq!(
            executor.count(&queries::unique_subjects()).await,
            Metric::Valid(7)
        );
    }

    #[tokio::test]
    async fn test_histogram_grouped() {
        let transport = ScriptedTransport::new().on(
            "GROUP BY ?class",
            Scripted::Rows(histogram_rows(
                "class",
                "classAmount",
                &[("http://ex/A", 10), ("http://ex/B", 4)],
            )),
        );
        let executor = QueryExecutor::new(&transport, "http://x/sparql");
        let (histogram, count) = executor.histogram(&queries::used_classes()).await;
        assert_eq!(count, Metric::Valid(2));
        assert_eq!(histogram.entries()[0].name, "http://ex/A");
        assert_eq!(histogram.entries()[1].amount, 4);
    }

    #[tokio::test]
    async fn test_histogram_unknown_when_all_fail() {
        let transport = ScriptedTransport::new().on("SELECT", Scripted::Fail("500".to_string()));
        let executor = QueryExecutor::new(&transport, "http://x/sparql");
        let (histogram, count) = executor.histogram(&queries::used_properties()).await;
        assert!(histogram.is_unknown());
        assert!(count.is_unknown());
    }

    #[tokio::test]
    async fn test_histogram_all_rungs_empty_is_unknown() {
        let transport = ScriptedTransport::new().on("SELECT", Scripted::Rows(vec![]));
        let executor = QueryExecutor::new(&transport, "http://x/sparql");
        let (histogram, count) = executor.histogram(&queries::used_classes()).await;
        assert_eq!(histogram, Histogram::Unknown);
        assert_eq!(count, Metric::Unknown);
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_forwarded() {
        let transport = ScriptedTransport::new().on("SELECT", Scripted::Rows(rows_of("s", 1)));
        let mut executor = QueryExecutor::new(&transport, "http://x/sparql");
        executor.set_timeout(Some(Duration::from_millis(30_000)));
        executor.execute("SELECT ?s WHERE { ?s ?p ?o }").await.unwrap();
        assert_eq!(
            transport.timeouts(),
            vec![Some(Duration::from_millis(30_000))]
        );
    }
}
