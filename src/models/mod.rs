//! Data models for lodcensus.

mod endpoint;
mod manifest;
mod metric;

pub use endpoint::{CustomQueryResult, EndpointRecord, EndpointStatus, NameEntry};
pub use manifest::{
    DatasetContext, DatasetDescriptor, EndpointKind, LocalizedText, Manifest, ManifestResource,
};
pub use metric::{
    derive_average_unique_subjects, derive_properties_amount, Histogram, InstanceCount, Metric,
    ERROR_NUMBER, LISTING_LIMIT, SIZE_LIMITS, UNIQUE_SUBJECT_LIMITS,
};
