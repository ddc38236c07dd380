//! Measured values for endpoint metrics.
//!
//! Public endpoints silently truncate results, so a number read back from
//! a probe is one of three things: an exact count, a count that hit a query
//! size limit (a lower bound), or nothing at all.

use serde::{Deserialize, Serialize};

/// Legacy numeric sentinel for "could not be determined".
pub const ERROR_NUMBER: i64 = -1;

/// Row limit used by the last rung of every fallback ladder.
pub const LISTING_LIMIT: u64 = 10_000;

/// Result sizes that public endpoints commonly cap count and listing
/// queries at. A count equal to one of these is a truncation artifact.
pub const SIZE_LIMITS: &[u64] = &[10_000, 100_000];

/// Result sizes seen capping distinct-subject queries.
pub const UNIQUE_SUBJECT_LIMITS: &[u64] = &[
    100, 500, 10_000, 50_000, 100_000, 250_000, 500_000, 1_000_000,
];

/// A single measured metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Exact value reported by the endpoint.
    Valid(u64),
    /// Value read at a query size limit; the real value may be larger.
    Saturated(u64),
    /// The value could not be determined.
    Unknown,
}

impl Metric {
    /// Classify a row count read from a query bounded by `limit`.
    pub fn from_row_count(count: u64, limit: Option<u64>) -> Self {
        match limit {
            Some(limit) if count >= limit => Metric::Saturated(count),
            _ => Metric::Valid(count),
        }
    }

    /// The number carried by this metric, if any.
    pub fn value(&self) -> Option<u64> {
        match self {
            Metric::Valid(n) | Metric::Saturated(n) => Some(*n),
            Metric::Unknown => None,
        }
    }

    /// Exact value only.
    pub fn valid(&self) -> Option<u64> {
        match self {
            Metric::Valid(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Metric::Unknown)
    }

    /// An exact value that is not one of the given truncation artifacts.
    pub fn trustworthy(&self, limits: &[u64]) -> Option<u64> {
        self.valid().filter(|n| !limits.contains(n))
    }

    /// Numeric form used in flat exports and indexed store columns.
    pub fn as_legacy_number(&self) -> i64 {
        self.value()
            .and_then(|n| i64::try_from(n).ok())
            .unwrap_or(ERROR_NUMBER)
    }
}

/// Usage count of one class or property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceCount {
    pub name: String,
    pub amount: u64,
}

/// Class or property usage histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Histogram {
    /// Histogram returned by the endpoint (possibly empty).
    Counted(Vec<InstanceCount>),
    /// No histogram could be obtained.
    Unknown,
}

impl Histogram {
    /// Entries of a counted histogram; empty for unknown.
    pub fn entries(&self) -> &[InstanceCount] {
        match self {
            Histogram::Counted(entries) => entries,
            Histogram::Unknown => &[],
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Histogram::Unknown)
    }
}

/// `triples - instances`, when both readings can be trusted.
pub fn derive_properties_amount(triples: Metric, instances: Metric) -> Metric {
    match (
        triples.trustworthy(SIZE_LIMITS),
        instances.trustworthy(SIZE_LIMITS),
    ) {
        (Some(t), Some(i)) if t > i => Metric::Valid(t - i),
        _ => Metric::Unknown,
    }
}

/// Average number of triples per distinct subject, when both readings can
/// be trusted.
pub fn derive_average_unique_subjects(triples: Metric, unique_subjects: Metric) -> Metric {
    match (
        triples.trustworthy(SIZE_LIMITS),
        unique_subjects.trustworthy(UNIQUE_SUBJECT_LIMITS),
    ) {
        (Some(t), Some(u)) if t > 0 && u > 0 && t > u => Metric::Valid(t / u),
        _ => Metric::Unknown,
    }
}
