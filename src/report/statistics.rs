//! Global statistics over stored endpoints.
//!
//! Only readings that can be trusted are aggregated: unknown values,
//! readings taken at a query limit and values equal to a known size limit
//! are left out.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{EndpointRecord, EndpointStatus, Metric, SIZE_LIMITS, UNIQUE_SUBJECT_LIMITS};

/// Count, sum and mean of the trustworthy values of one metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub can_get: usize,
    pub sum: u64,
    pub average: f64,
}

impl MetricSummary {
    fn collect(values: impl Iterator<Item = u64>) -> Self {
        let (can_get, sum) = values.fold((0usize, 0u64), |(n, s), v| (n + 1, s.saturating_add(v)));
        let average = if can_get == 0 {
            0.0
        } else {
            sum as f64 / can_get as f64
        };
        Self {
            can_get,
            sum,
            average,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatioSummary {
    pub can_get: usize,
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub endpoints: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub triples: MetricSummary,
    pub classes: MetricSummary,
    pub instances: MetricSummary,
    pub used_properties: MetricSummary,
    pub properties: MetricSummary,
    pub unique_subjects: MetricSummary,
    pub average_unique_subjects: MetricSummary,
    /// Distinct subjects per triple, from endpoints where both readings
    /// are trustworthy.
    pub unique_subjects_per_triple: RatioSummary,
}

fn trusted(metric: Option<Metric>, limits: &[u64]) -> Option<u64> {
    metric.and_then(|m| m.trustworthy(limits))
}

impl Statistics {
    pub fn from_records(records: &[EndpointRecord]) -> Self {
        let mut status_counts: BTreeMap<String, usize> = EndpointStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for record in records {
            *status_counts
                .entry(record.status.as_str().to_string())
                .or_default() += 1;
        }

        let ok: Vec<&EndpointRecord> = records.iter().filter(|r| r.is_ok()).collect();
        let summary = |field: fn(&EndpointRecord) -> Option<Metric>, limits: &[u64]| {
            MetricSummary::collect(ok.iter().filter_map(|r| trusted(field(r), limits)))
        };

        let ratios: Vec<f64> = ok
            .iter()
            .filter_map(|r| {
                let triples = trusted(r.triples_amount, SIZE_LIMITS)?;
                let subjects = trusted(r.unique_subjects_amount, UNIQUE_SUBJECT_LIMITS)?;
                (triples > 0 && subjects > 0).then(|| subjects as f64 / triples as f64)
            })
            .collect();
        let unique_subjects_per_triple = RatioSummary {
            can_get: ratios.len(),
            average: if ratios.is_empty() {
                0.0
            } else {
                ratios.iter().sum::<f64>() / ratios.len() as f64
            },
        };

        Self {
            endpoints: records.len(),
            status_counts,
            triples: summary(|r| r.triples_amount, SIZE_LIMITS),
            classes: summary(|r| r.classes_amount, SIZE_LIMITS),
            instances: summary(|r| r.instances_amount, SIZE_LIMITS),
            used_properties: summary(|r| r.used_properties_amount, SIZE_LIMITS),
            properties: summary(|r| r.properties_amount, SIZE_LIMITS),
            unique_subjects: summary(|r| r.unique_subjects_amount, UNIQUE_SUBJECT_LIMITS),
            average_unique_subjects: summary(|r| r.average_unique_subjects_amount, &[]),
            unique_subjects_per_triple,
        }
    }
}
