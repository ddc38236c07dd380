//! Storage interface for endpoint records.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::pool::DieselError;
use crate::models::{EndpointRecord, EndpointStatus, Histogram, Metric};

/// Schema version written with every stored document.
pub const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DieselError),

    #[error("Invalid stored document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document for {access_url} has schema version {found}, this build reads up to {supported}")]
    UnsupportedSchema {
        access_url: String,
        found: i32,
        supported: i32,
    },
}

/// Record selection; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointFilter {
    pub status: Option<EndpointStatus>,
    pub domain: Option<String>,
}

impl EndpointFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn status(status: EndpointStatus) -> Self {
        Self {
            status: Some(status),
            domain: None,
        }
    }

    pub fn in_domain(mut self, domain: Option<&str>) -> Self {
        self.domain = domain.map(|d| d.to_string());
        self
    }
}

/// Content fingerprint used for duplicate detection: triple and class
/// counts plus both usage histograms.
///
/// Records without a known triple count have no signature, nor do records
/// where any other fingerprint reading is unknown.
pub fn record_signature(record: &EndpointRecord) -> Option<String> {
    match record.triples_amount {
        None | Some(Metric::Unknown) => return None,
        Some(_) => {}
    }
    let unknown_histogram = [&record.used_properties, &record.used_classes]
        .into_iter()
        .any(|h| h.as_ref().is_some_and(Histogram::is_unknown));
    if record.classes_amount == Some(Metric::Unknown) || unknown_histogram {
        return None;
    }
    let fingerprint = serde_json::to_string(&(
        &record.triples_amount,
        &record.classes_amount,
        &record.used_properties,
        &record.used_classes,
    ))
    .ok()?;

    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    Some(hex::encode(hasher.finalize()))
}

/// Document collection of endpoint records keyed by access URL.
#[async_trait]
pub trait EndpointStore: Send + Sync {
    /// Insert or fully replace a record.
    async fn upsert(&self, record: &EndpointRecord) -> Result<(), StoreError>;

    async fn get(&self, access_url: &str) -> Result<Option<EndpointRecord>, StoreError>;

    /// Oldest record with the given signature other than `exclude_url`.
    async fn find_by_signature(
        &self,
        signature: &str,
        exclude_url: &str,
    ) -> Result<Option<EndpointRecord>, StoreError>;

    async fn find(&self, filter: &EndpointFilter) -> Result<Vec<EndpointRecord>, StoreError>;

    /// Distinct domains, sorted descending.
    async fn domains(&self) -> Result<Vec<String>, StoreError>;

    async fn delete(&self, access_url: &str) -> Result<bool, StoreError>;

    /// Remove the named custom query results from every record. Returns the
    /// number of records changed.
    async fn delete_fields(&self, names: &[String]) -> Result<usize, StoreError>;

    /// Remove every record. Returns how many there were.
    async fn drop_collection(&self) -> Result<usize, StoreError>;

    async fn count(&self, filter: &EndpointFilter) -> Result<usize, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Histogram, InstanceCount};

    #[test]
    fn test_signature_requires_known_triples() {
        let mut record = EndpointRecord::new("http://x/sparql");
        assert!(record_signature(&record).is_none());
        record.triples_amount = Some(Metric::Unknown);
        assert!(record_signature(&record).is_none());
        record.triples_amount = Some(Metric::Valid(500));
        assert_eq!(record_signature(&record).map(|s| s.len()), Some(64));
    }

    #[test]
    fn test_signature_ignores_identity_fields() {
        let mut a = EndpointRecord::new("http://a/sparql");
        a.triples_amount = Some(Metric::Valid(500));
        a.classes_amount = Some(Metric::Valid(10));
        a.used_classes = Some(Histogram::Counted(vec![InstanceCount {
            name: "http://ex/C".to_string(),
            amount: 3,
        }]));
        let mut b = a.clone();
        b.access_url = "http://b/sparql".to_string();
        b.add_domain("Government");
        assert_eq!(record_signature(&a), record_signature(&b));

        b.classes_amount = Some(Metric::Valid(11));
        assert_ne!(record_signature(&a), record_signature(&b));
    }

    #[test]
    fn test_signature_requires_known_histograms_and_classes() {
        let mut record = EndpointRecord::new("http://x/sparql");
        record.triples_amount = Some(Metric::Valid(500));
        record.classes_amount = Some(Metric::Valid(0));
        record.used_classes = Some(Histogram::Counted(vec![]));
        record.used_properties = Some(Histogram::Counted(vec![]));
        assert!(record_signature(&record).is_some());

        record.used_properties = Some(Histogram::Unknown);
        assert!(record_signature(&record).is_none());

        record.used_properties = Some(Histogram::Counted(vec![]));
        record.classes_amount = Some(Metric::Unknown);
        assert!(record_signature(&record).is_none());
    }
}
