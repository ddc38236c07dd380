//! LOD Cloud manifest import.
//!
//! Walks every dataset of the manifest, probes each endpoint the first
//! time it is seen and merges later sightings of endpoints already known
//! to be working.

mod manifest_source;

pub use manifest_source::{download_manifest, load_or_fetch_manifest, ImportError};

use tracing::{debug, info, warn};

use crate::duplicates::DuplicateDetector;
use crate::models::{DatasetContext, EndpointStatus, Manifest, ManifestResource};
use crate::probe::{EndpointProber, ProbeOptions, Reachability};
use crate::repository::{EndpointFilter, EndpointStore, StoreError};
use crate::sparql::SparqlTransport;

/// Statistics collected during an import or refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Datasets walked.
    pub datasets: usize,
    /// Endpoint references encountered, including repeats.
    pub endpoints_seen: usize,
    /// Endpoints probed and stored as OK.
    pub ok: usize,
    /// Endpoints probed and stored as FAIL.
    pub failed: usize,
    /// Endpoints stored as duplicates of an earlier one.
    pub duplicates: usize,
    /// Known OK endpoints whose names or domains were merged.
    pub merged: usize,
    /// Known endpoints left untouched.
    pub skipped: usize,
    /// Store failures; the endpoint was not written.
    pub errors: usize,
}

impl ImportStats {
    /// Endpoints probed during the run.
    pub fn probed(&self) -> usize {
        self.ok + self.failed + self.duplicates
    }

    fn count_stored(&mut self, status: EndpointStatus) {
        match status {
            EndpointStatus::Ok => self.ok += 1,
            EndpointStatus::Fail => self.failed += 1,
            EndpointStatus::Duplicate => self.duplicates += 1,
            EndpointStatus::Unknown => self.skipped += 1,
        }
    }
}

/// Endpoint-like resources of one dataset, in processing order: other
/// downloads that look like endpoints first, then declared endpoints.
fn endpoint_resources(dataset: &crate::models::DatasetDescriptor) -> Vec<&ManifestResource> {
    dataset
        .other_download
        .iter()
        .filter(|r| r.other_download_kind().is_some())
        .chain(dataset.sparql.iter())
        .collect()
}

pub struct ManifestImporter<'a> {
    store: &'a dyn EndpointStore,
    prober: EndpointProber<'a>,
    detector: DuplicateDetector<'a>,
}

impl<'a> ManifestImporter<'a> {
    pub fn new(transport: &'a dyn SparqlTransport, store: &'a dyn EndpointStore) -> Self {
        Self {
            store,
            prober: EndpointProber::new(transport),
            detector: DuplicateDetector::new(store),
        }
    }

    /// Process every endpoint of the manifest, one at a time.
    pub async fn import_from(&self, manifest: &Manifest, options: &ProbeOptions) -> ImportStats {
        let mut stats = ImportStats::default();

        for (code, dataset) in &manifest.datasets {
            stats.datasets += 1;
            let context = DatasetContext::new(code, dataset);

            for resource in endpoint_resources(dataset) {
                let Some(url) = resource.url() else {
                    debug!("Dataset {} lists an endpoint without URL", code);
                    continue;
                };
                stats.endpoints_seen += 1;
                self.process_endpoint(url, resource, &context, options, &mut stats)
                    .await;
            }
        }

        info!(
            "Import finished: {} datasets, {} probed, {} merged, {} errors",
            stats.datasets,
            stats.probed(),
            stats.merged,
            stats.errors
        );
        stats
    }

    async fn process_endpoint(
        &self,
        url: &str,
        resource: &ManifestResource,
        context: &DatasetContext,
        options: &ProbeOptions,
        stats: &mut ImportStats,
    ) {
        let existing = match self.store.get(url).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Could not look up {}: {}", url, e);
                stats.errors += 1;
                return;
            }
        };

        match existing {
            Some(mut record) if record.is_ok() => {
                let mut changed = record.add_name(context.name_entry(resource));
                if let Some(domain) = &context.domain {
                    changed |= record.add_domain(domain);
                }
                if !changed {
                    stats.skipped += 1;
                    return;
                }
                record.touch();
                match self.store.upsert(&record).await {
                    Ok(()) => {
                        debug!("Merged dataset {} into {}", context.code, url);
                        stats.merged += 1;
                    }
                    Err(e) => {
                        warn!("Could not update {}: {}", url, e);
                        stats.errors += 1;
                    }
                }
            }
            Some(record) => {
                debug!("Leaving {} endpoint {} untouched", record.status, url);
                stats.skipped += 1;
            }
            None => {
                info!("Probing {} ({})", url, context.code);
                let mut record = self.prober.probe(url, options).await;
                record.add_name(context.name_entry(resource));
                for domain in context.domains() {
                    record.add_domain(&domain);
                }

                if record.is_ok() {
                    if let Err(e) = self.detector.mark_if_duplicate(&mut record).await {
                        warn!("Duplicate check failed for {}: {}", url, e);
                    }
                }

                match self.store.upsert(&record).await {
                    Ok(()) => stats.count_stored(record.status),
                    Err(e) => {
                        warn!("Could not store {}: {}", url, e);
                        stats.errors += 1;
                    }
                }
            }
        }
    }

    /// Re-run custom queries against every stored OK endpoint.
    ///
    /// An endpoint that has become unreachable keeps its stored record.
    pub async fn refresh_custom_queries(
        &self,
        options: &ProbeOptions,
    ) -> Result<ImportStats, StoreError> {
        let refresh = ProbeOptions {
            include_base_queries: false,
            ..options.clone()
        };
        let mut stats = ImportStats::default();

        for mut record in self
            .store
            .find(&EndpointFilter::status(EndpointStatus::Ok))
            .await?
        {
            stats.endpoints_seen += 1;
            info!("Refreshing custom queries for {}", record.access_url);

            match self.prober.probe_into(&mut record, &refresh).await {
                Reachability::Reachable => match self.store.upsert(&record).await {
                    Ok(()) => stats.ok += 1,
                    Err(e) => {
                        warn!("Could not update {}: {}", record.access_url, e);
                        stats.errors += 1;
                    }
                },
                Reachability::Unreachable(error) => {
                    warn!(
                        "Keeping stored record for unreachable {}: {}",
                        record.access_url, error
                    );
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomQueryResult, EndpointRecord, Metric};
    use crate::repository::{AsyncSqlitePool, DieselEndpointRepository};
    use crate::sparql::mock::{count_row, rows_of, Scripted, ScriptedTransport};
    use crate::sparql::CONNECTIVITY_QUERY;
    use tempfile::tempdir;

    async fn setup_store() -> (DieselEndpointRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let pool = AsyncSqlitePool::from_path(&dir.path().join("test.db"));
        pool.init_schema().await.unwrap();
        (DieselEndpointRepository::new(pool), dir)
    }

    fn reachable() -> ScriptedTransport {
        ScriptedTransport::new()
            .on(CONNECTIVITY_QUERY, Scripted::Rows(rows_of("s", 10)))
            .on("?triplesAmount", Scripted::Rows(vec![count_row("triplesAmount", 4321)]))
            .on("?classesAmount", Scripted::Rows(vec![count_row("classesAmount", 0)]))
            .on("?propertiesAmount", Scripted::Rows(vec![count_row("propertiesAmount", 0)]))
            .on("SELECT", Scripted::Rows(vec![]))
    }

    const TWO_DATASETS: &str = r#"{
        "d1": {
            "title": "First",
            "domain": "Government",
            "sparql": [{"access_url": "http://x/sparql", "title": "Main endpoint"}],
            "other_download": []
        },
        "d2": {
            "title": "Second",
            "domain": "Linguistics",
            "sparql": [{"access_url": "http://x/sparql"}],
            "other_download": [
                {"access_url": "http://y/query", "description": "SPARQL endpoint"},
                {"access_url": "http://y/dump.nt", "title": "dump"}
            ]
        }
    }"#;

    #[tokio::test]
    async fn test_shared_endpoint_merged_not_reprobed() {
        let (store, _dir) = setup_store().await;
        let transport = reachable();
        let manifest = Manifest::from_json(TWO_DATASETS).unwrap();

        let importer = ManifestImporter::new(&transport, &store);
        let stats = importer
            .import_from(&manifest, &ProbeOptions::default())
            .await;

        assert_eq!(stats.datasets, 2);
        assert_eq!(stats.endpoints_seen, 3);
        assert_eq!(stats.merged, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(store.count(&EndpointFilter::all()).await.unwrap(), 2);

        let x = store.get("http://x/sparql").await.unwrap().unwrap();
        assert_eq!(x.domains, vec!["Government", "Linguistics"]);
        assert_eq!(x.names.len(), 2);
        assert_eq!(x.names[0].endpoint_title, "Main endpoint");
        assert_eq!(x.names[1].endpoint_title, "Second");
        assert_eq!(x.triples_amount, Some(Metric::Valid(4321)));

        // y has the same triple count as x and both report zero distinct
        // classes and properties
        let y = store.get("http://y/query").await.unwrap().unwrap();
        assert_eq!(y.status, EndpointStatus::Duplicate);
        assert_eq!(y.duplicate_reference.as_deref(), Some("http://x/sparql"));
    }

    #[tokio::test]
    async fn test_silent_endpoints_are_not_duplicates() {
        let (store, _dir) = setup_store().await;
        let transport = ScriptedTransport::new()
            .on(CONNECTIVITY_QUERY, Scripted::Rows(rows_of("s", 10)))
            .on("?triplesAmount", Scripted::Rows(vec![count_row("triplesAmount", 4321)]))
            .on("SELECT", Scripted::Rows(vec![]));
        let manifest = Manifest::from_json(TWO_DATASETS).unwrap();

        let stats = ManifestImporter::new(&transport, &store)
            .import_from(&manifest, &ProbeOptions::default())
            .await;
        assert_eq!(stats.ok, 2);
        assert_eq!(stats.duplicates, 0);

        let y = store.get("http://y/query").await.unwrap().unwrap();
        assert_eq!(y.status, EndpointStatus::Ok);
        assert_eq!(y.classes_amount, Some(Metric::Unknown));
    }

    #[test]
    fn test_other_downloads_processed_before_declared_endpoints() {
        let manifest = Manifest::from_json(TWO_DATASETS).unwrap();
        let urls: Vec<_> = endpoint_resources(&manifest.datasets["d2"])
            .into_iter()
            .filter_map(|r| r.url())
            .collect();
        assert_eq!(urls, vec!["http://y/query", "http://x/sparql"]);
    }

    #[tokio::test]
    async fn test_reimport_does_not_reprobe() {
        let (store, _dir) = setup_store().await;
        let transport = reachable();
        let manifest = Manifest::from_json(TWO_DATASETS).unwrap();
        let importer = ManifestImporter::new(&transport, &store);

        importer
            .import_from(&manifest, &ProbeOptions::default())
            .await;
        let calls = transport.calls().len();

        let stats = importer
            .import_from(&manifest, &ProbeOptions::default())
            .await;
        assert_eq!(transport.calls().len(), calls);
        assert_eq!(stats.probed(), 0);
        assert_eq!(store.count(&EndpointFilter::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_non_ok_endpoints_left_untouched() {
        let (store, _dir) = setup_store().await;
        store
            .upsert(&EndpointRecord::placeholder("http://x/sparql"))
            .await
            .unwrap();
        let mut failed = EndpointRecord::new("http://y/query");
        failed.status = EndpointStatus::Fail;
        store.upsert(&failed).await.unwrap();

        let transport = reachable();
        let manifest = Manifest::from_json(TWO_DATASETS).unwrap();
        let stats = ManifestImporter::new(&transport, &store)
            .import_from(&manifest, &ProbeOptions::default())
            .await;

        assert_eq!(stats.skipped, 3);
        assert!(transport.calls().is_empty());
        let x = store.get("http://x/sparql").await.unwrap().unwrap();
        assert!(x.domains.is_empty());
        assert!(x.names.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_keeps_unreachable_ok_record() {
        let (store, _dir) = setup_store().await;
        let mut record = EndpointRecord::new("http://x/sparql");
        record.status = EndpointStatus::Ok;
        record.triples_amount = Some(Metric::Valid(77));
        store.upsert(&record).await.unwrap();

        let queries = tempdir().unwrap();
        std::fs::write(queries.path().join("labels.sparql"), "SELECT ?label WHERE { ?s ?p ?label }").unwrap();
        let options = ProbeOptions {
            include_base_queries: false,
            custom_queries_dir: Some(queries.path().to_path_buf()),
            only_new_custom_queries: false,
        };

        let down = ScriptedTransport::new();
        let stats = ManifestImporter::new(&down, &store)
            .refresh_custom_queries(&options)
            .await
            .unwrap();
        assert_eq!(stats.skipped, 1);
        let stored = store.get("http://x/sparql").await.unwrap().unwrap();
        assert_eq!(stored.status, EndpointStatus::Ok);
        assert!(stored.custom_queries.is_empty());

        let up = ScriptedTransport::new()
            .on(CONNECTIVITY_QUERY, Scripted::Rows(rows_of("s", 10)))
            .on("?label", Scripted::Rows(rows_of("label", 3)));
        let stats = ManifestImporter::new(&up, &store)
            .refresh_custom_queries(&options)
            .await
            .unwrap();
        assert_eq!(stats.ok, 1);
        let stored = store.get("http://x/sparql").await.unwrap().unwrap();
        assert!(matches!(
            stored.custom_queries.get("labels"),
            Some(CustomQueryResult::Rows(rows)) if rows.len() == 3
        ));
        assert_eq!(stored.triples_amount, Some(Metric::Valid(77)));
    }
}
