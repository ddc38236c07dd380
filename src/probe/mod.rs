//! Endpoint probing: connectivity, landing page metadata, the analytical
//! battery and custom queries.

mod custom_queries;
mod landing;

pub use custom_queries::{custom_query_names, load_custom_queries, CustomQuery, CustomQueryError};
pub use landing::LandingPage;

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::models::{
    derive_average_unique_subjects, derive_properties_amount, CustomQueryResult, EndpointRecord,
    EndpointStatus, Histogram, Metric,
};
use crate::sparql::{queries, HistogramLadder, QueryExecutor, SparqlTransport, CONNECTIVITY_QUERY};

/// What to run against an endpoint.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub include_base_queries: bool,
    pub custom_queries_dir: Option<PathBuf>,
    /// Skip custom queries whose result the record already holds.
    pub only_new_custom_queries: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            include_base_queries: true,
            custom_queries_dir: None,
            only_new_custom_queries: true,
        }
    }
}

/// Outcome of the connectivity test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable(String),
}

/// Probes endpoints over a SPARQL transport.
pub struct EndpointProber<'a> {
    transport: &'a dyn SparqlTransport,
}

impl<'a> EndpointProber<'a> {
    pub fn new(transport: &'a dyn SparqlTransport) -> Self {
        Self { transport }
    }

    /// Probe a never-seen endpoint. The record is not persisted.
    pub async fn probe(&self, access_url: &str, options: &ProbeOptions) -> EndpointRecord {
        let mut record = EndpointRecord::new(access_url);
        if let Reachability::Unreachable(error) = self.probe_into(&mut record, options).await {
            record.status = EndpointStatus::Fail;
            record.error_message = Some(error);
        }
        record
    }

    /// Probe an existing record in place.
    ///
    /// An unreachable endpoint leaves the record exactly as it was; the
    /// caller decides what a failure means for it.
    pub async fn probe_into(
        &self,
        record: &mut EndpointRecord,
        options: &ProbeOptions,
    ) -> Reachability {
        let mut executor = QueryExecutor::new(self.transport, record.access_url.clone());

        info!("Testing connection to {}", record.access_url);
        if let Err(e) = executor.execute(CONNECTIVITY_QUERY).await {
            warn!("{} is unreachable: {}", record.access_url, e);
            return Reachability::Unreachable(e.to_string());
        }
        record.status = EndpointStatus::Ok;
        record.error_message = None;

        let landing = self.landing_page(&record.access_url).await;
        if landing.timeout.is_some() {
            debug!(
                "Using advertised timeout {:?} for {}",
                landing.timeout, record.access_url
            );
            executor.set_timeout(landing.timeout);
        }

        if options.include_base_queries {
            record.query_editor_name = landing.query_editor_name;
            record.query_editor_additional_information = landing.additional_information;
            run_battery(&executor, record).await;
        }

        if let Some(dir) = &options.custom_queries_dir {
            run_custom_queries(&executor, record, dir, options.only_new_custom_queries).await;
        }

        record.touch();
        Reachability::Reachable
    }

    async fn landing_page(&self, url: &str) -> LandingPage {
        match self.transport.get_text(url).await {
            Ok(html) => LandingPage::parse(&html),
            Err(e) => {
                debug!("No landing page for {}: {}", url, e);
                LandingPage::default()
            }
        }
    }
}

/// Histogram plus its length; falls back to the count ladder when no
/// histogram could be obtained.
///
/// A distinct count of zero from the fallback means the histogram is
/// genuinely empty.
async fn histogram_and_count(
    executor: &QueryExecutor<'_>,
    histogram: &HistogramLadder,
    fallback: &queries::CountLadder,
) -> (Histogram, Metric) {
    match executor.histogram(histogram).await {
        (Histogram::Unknown, _) => match executor.count(fallback).await {
            Metric::Valid(0) => (Histogram::Counted(Vec::new()), Metric::Valid(0)),
            count => (Histogram::Unknown, count),
        },
        counted => counted,
    }
}

async fn run_battery(executor: &QueryExecutor<'_>, record: &mut EndpointRecord) {
    info!("Getting total triples...");
    let triples = executor.count(&queries::triples()).await;
    record.triples_amount = Some(triples);

    info!("Getting used classes...");
    let (used_classes, classes_amount) =
        histogram_and_count(executor, &queries::used_classes(), &queries::classes_count()).await;
    record.used_classes = Some(used_classes);
    record.classes_amount = Some(classes_amount);

    info!("Getting instances...");
    let instances = executor.count(&queries::instances()).await;
    record.instances_amount = Some(instances);

    info!("Getting used properties...");
    let (used_properties, used_properties_amount) = histogram_and_count(
        executor,
        &queries::used_properties(),
        &queries::properties_count(),
    )
    .await;
    record.used_properties = Some(used_properties);
    record.used_properties_amount = Some(used_properties_amount);

    info!("Getting unique subjects...");
    let unique_subjects = executor.count(&queries::unique_subjects()).await;
    record.unique_subjects_amount = Some(unique_subjects);

    record.properties_amount = Some(derive_properties_amount(triples, instances));
    record.average_unique_subjects_amount =
        Some(derive_average_unique_subjects(triples, unique_subjects));
}

async fn run_custom_queries(
    executor: &QueryExecutor<'_>,
    record: &mut EndpointRecord,
    dir: &std::path::Path,
    only_new: bool,
) {
    let custom_queries = match load_custom_queries(dir) {
        Ok(queries) => queries,
        Err(e) => {
            warn!("Skipping custom queries: {}", e);
            return;
        }
    };

    info!("Performing custom queries...");
    for query in custom_queries {
        if only_new && record.has_custom_query(&query.name) {
            debug!("{} already has {}", record.access_url, query.name);
            continue;
        }
        let result = match executor.execute(&query.body).await {
            Ok(rows) => CustomQueryResult::Rows(rows),
            Err(e) => {
                warn!("Custom query {} failed on {}: {}", query.name, record.access_url, e);
                CustomQueryResult::Failed {
                    error: e.to_string(),
                }
            }
        };
        record.custom_queries.insert(query.name, result);
    }
}
