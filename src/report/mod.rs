//! Read-only reports over the endpoint store.

mod statistics;

pub use statistics::{MetricSummary, RatioSummary, Statistics};

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{EndpointRecord, EndpointStatus, Histogram, Metric, NameEntry};
use crate::repository::{EndpointFilter, EndpointStore, StoreError};

/// How many entries a top-N report keeps.
pub const TOP_INSTANCES_LIMIT: usize = 50;

/// Which usage histogram a top-N report unwinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramField {
    UsedProperties,
    UsedClasses,
}

impl HistogramField {
    fn of(self, record: &EndpointRecord) -> Option<&Histogram> {
        match self {
            HistogramField::UsedProperties => record.used_properties.as_ref(),
            HistogramField::UsedClasses => record.used_classes.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceTotal {
    pub name: String,
    pub total: u64,
}

/// Identifying and metric fields of one OK endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointTotals {
    pub access_url: String,
    pub names: Vec<NameEntry>,
    pub domains: Vec<String>,
    pub query_editor_name: String,
    pub triples_amount: Option<Metric>,
    pub classes_amount: Option<Metric>,
    pub instances_amount: Option<Metric>,
    pub used_properties_amount: Option<Metric>,
    pub properties_amount: Option<Metric>,
    pub unique_subjects_amount: Option<Metric>,
    pub average_unique_subjects_amount: Option<Metric>,
}

impl From<EndpointRecord> for EndpointTotals {
    fn from(record: EndpointRecord) -> Self {
        Self {
            access_url: record.access_url,
            names: record.names,
            domains: record.domains,
            query_editor_name: record.query_editor_name,
            triples_amount: record.triples_amount,
            classes_amount: record.classes_amount,
            instances_amount: record.instances_amount,
            used_properties_amount: record.used_properties_amount,
            properties_amount: record.properties_amount,
            unique_subjects_amount: record.unique_subjects_amount,
            average_unique_subjects_amount: record.average_unique_subjects_amount,
        }
    }
}

fn sort_key(metric: Option<Metric>) -> i64 {
    metric.map_or(crate::models::ERROR_NUMBER, |m| m.as_legacy_number())
}

/// Sum usage counts per name, largest first, ties by name.
pub fn top_instances<'r>(
    records: impl IntoIterator<Item = &'r EndpointRecord>,
    field: HistogramField,
    limit: usize,
) -> Vec<InstanceTotal> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for record in records {
        if let Some(histogram) = field.of(record) {
            for entry in histogram.entries() {
                *totals.entry(entry.name.as_str()).or_default() += entry.amount;
            }
        }
    }

    let mut totals: Vec<InstanceTotal> = totals
        .into_iter()
        .map(|(name, total)| InstanceTotal {
            name: name.to_string(),
            total,
        })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    totals.truncate(limit);
    totals
}

pub struct Reporter<'a> {
    store: &'a dyn EndpointStore,
}

impl<'a> Reporter<'a> {
    pub fn new(store: &'a dyn EndpointStore) -> Self {
        Self { store }
    }

    /// Most used properties or classes across stored endpoints.
    pub async fn top_instances(
        &self,
        field: HistogramField,
        domain: Option<&str>,
    ) -> Result<Vec<InstanceTotal>, StoreError> {
        let records = self
            .store
            .find(&EndpointFilter::all().in_domain(domain))
            .await?;
        Ok(top_instances(&records, field, TOP_INSTANCES_LIMIT))
    }

    /// Distinct domains, sorted descending.
    pub async fn domains(&self) -> Result<Vec<String>, StoreError> {
        self.store.domains().await
    }

    /// OK endpoints sorted by triples, classes and instances, largest first.
    pub async fn collection_totals(
        &self,
        domain: Option<&str>,
    ) -> Result<Vec<EndpointTotals>, StoreError> {
        let mut totals: Vec<EndpointTotals> = self
            .store
            .find(&EndpointFilter::status(EndpointStatus::Ok).in_domain(domain))
            .await?
            .into_iter()
            .map(EndpointTotals::from)
            .collect();

        totals.sort_by(|a, b| {
            sort_key(b.triples_amount)
                .cmp(&sort_key(a.triples_amount))
                .then_with(|| sort_key(b.classes_amount).cmp(&sort_key(a.classes_amount)))
                .then_with(|| sort_key(b.instances_amount).cmp(&sort_key(a.instances_amount)))
        });
        Ok(totals)
    }

    /// Status counts and metric summaries, optionally for one domain.
    pub async fn statistics(&self, domain: Option<&str>) -> Result<Statistics, StoreError> {
        let records = self
            .store
            .find(&EndpointFilter::all().in_domain(domain))
            .await?;
        Ok(Statistics::from_records(&records))
    }
}
