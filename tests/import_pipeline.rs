//! End-to-end import against an in-process SPARQL transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::tempdir;

use lodcensus::dump::export_dump;
use lodcensus::import::ManifestImporter;
use lodcensus::models::{EndpointStatus, Manifest, Metric};
use lodcensus::probe::ProbeOptions;
use lodcensus::report::Reporter;
use lodcensus::repository::{AsyncSqlitePool, DieselEndpointRepository, EndpointFilter, EndpointStore};
use lodcensus::sparql::{QueryError, RdfTerm, Row, SparqlTransport, CONNECTIVITY_QUERY};

const MANIFEST: &str = r#"{
    "d1": {
        "title": "Dataset one",
        "domain": "Government",
        "sparql": [{"access_url": "http://x/sparql", "title": "Endpoint"}]
    }
}"#;

/// Answers the connectivity test when `reachable`; every other query
/// comes back empty.
struct FakeEndpoint {
    reachable: bool,
    connectivity_checks: AtomicUsize,
}

impl FakeEndpoint {
    fn new(reachable: bool) -> Self {
        Self {
            reachable,
            connectivity_checks: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SparqlTransport for FakeEndpoint {
    async fn select(
        &self,
        _endpoint: &str,
        query: &str,
        _timeout: Option<Duration>,
    ) -> Result<Vec<Row>, QueryError> {
        if query == CONNECTIVITY_QUERY {
            self.connectivity_checks.fetch_add(1, Ordering::SeqCst);
            if !self.reachable {
                return Err(QueryError::Transport("connection refused".to_string()));
            }
            let mut row = Row::new();
            row.insert("s".to_string(), RdfTerm::uri("http://x/resource/1"));
            return Ok(vec![row]);
        }
        Ok(Vec::new())
    }

    async fn get_text(&self, _url: &str) -> Result<String, QueryError> {
        Err(QueryError::Status { status: 404 })
    }
}

async fn open_store(dir: &std::path::Path) -> DieselEndpointRepository {
    let pool = AsyncSqlitePool::from_path(&dir.join("census.db"));
    pool.init_schema().await.unwrap();
    DieselEndpointRepository::new(pool)
}

#[tokio::test]
async fn test_reachable_endpoint_imported_once() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path()).await;
    let transport = FakeEndpoint::new(true);
    let manifest = Manifest::from_json(MANIFEST).unwrap();
    let options = ProbeOptions::default();

    let stats = ManifestImporter::new(&transport, &store)
        .import_from(&manifest, &options)
        .await;
    assert_eq!(stats.ok, 1);

    let records = store.find(&EndpointFilter::all()).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.access_url, "http://x/sparql");
    assert_eq!(record.status, EndpointStatus::Ok);
    assert_eq!(record.domains, vec!["Government".to_string()]);
    assert_eq!(record.names.len(), 1);
    assert_eq!(record.triples_amount, Some(Metric::Unknown));

    // Second run merges nothing new and probes nothing
    let stats = ManifestImporter::new(&transport, &store)
        .import_from(&manifest, &options)
        .await;
    assert_eq!(stats.probed(), 0);
    assert_eq!(transport.connectivity_checks.load(Ordering::SeqCst), 1);
    assert_eq!(store.count(&EndpointFilter::all()).await.unwrap(), 1);

    let stats = Reporter::new(&store).statistics(None).await.unwrap();
    assert_eq!(stats.status_counts["OK"], 1);
    assert_eq!(stats.triples.can_get, 0);
    assert_eq!(stats.classes.can_get, 0);
    assert_eq!(stats.used_properties.can_get, 0);
}

#[tokio::test]
async fn test_unreachable_endpoint_stored_as_fail() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path()).await;
    let transport = FakeEndpoint::new(false);
    let manifest = Manifest::from_json(MANIFEST).unwrap();

    for _ in 0..2 {
        ManifestImporter::new(&transport, &store)
            .import_from(&manifest, &ProbeOptions::default())
            .await;
    }

    let records = store.find(&EndpointFilter::all()).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.status, EndpointStatus::Fail);
    assert_eq!(record.domains, vec!["Government".to_string()]);
    assert!(record.error_message.is_some());
    assert!(record.triples_amount.is_none());
    assert!(record.custom_queries.is_empty());

    let path = export_dump(&dir.path().join("dumps"), "collection", &records).unwrap();
    let dumped: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(dumped[0]["status"], "FAIL");
}
