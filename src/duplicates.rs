//! Detection of endpoints that serve the same data under another URL.

use tracing::info;

use crate::models::EndpointRecord;
use crate::repository::{record_signature, EndpointStore, StoreError};

pub struct DuplicateDetector<'a> {
    store: &'a dyn EndpointStore,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(store: &'a dyn EndpointStore) -> Self {
        Self { store }
    }

    /// Stored record with the same triple count, class count and usage
    /// histograms under a different access URL.
    ///
    /// Records whose triple count is unknown are never matched.
    pub async fn find_duplicate(
        &self,
        record: &EndpointRecord,
    ) -> Result<Option<EndpointRecord>, StoreError> {
        let Some(signature) = record_signature(record) else {
            return Ok(None);
        };
        let found = self
            .store
            .find_by_signature(&signature, &record.access_url)
            .await?;
        if let Some(original) = &found {
            info!(
                "{} duplicates {}",
                record.access_url, original.access_url
            );
        }
        Ok(found)
    }

    /// Look for a duplicate and mark the record if one exists.
    pub async fn mark_if_duplicate(&self, record: &mut EndpointRecord) -> Result<bool, StoreError> {
        match self.find_duplicate(record).await? {
            Some(original) => {
                record.mark_duplicate_of(&original.access_url);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
