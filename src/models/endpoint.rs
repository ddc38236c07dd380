//! Endpoint records: one per unique SPARQL access URL.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metric::{Histogram, Metric};
use crate::sparql::Row;

/// Probe outcome of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointStatus {
    /// Connectivity test passed and the battery ran.
    Ok,
    /// Connectivity test failed.
    Fail,
    /// Placeholder inserted by hand so imports skip the endpoint.
    Unknown,
    /// Same signature as an endpoint already stored.
    Duplicate,
}

impl EndpointStatus {
    pub const ALL: [EndpointStatus; 4] = [Self::Ok, Self::Fail, Self::Unknown, Self::Duplicate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "FAIL",
            Self::Unknown => "UNKNOWN",
            Self::Duplicate => "DUPLICATE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(Self::Ok),
            "FAIL" => Some(Self::Fail),
            "UNKNOWN" => Some(Self::Unknown),
            "DUPLICATE" => Some(Self::Duplicate),
            _ => None,
        }
    }
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptive metadata contributed by one dataset registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    pub endpoint_title: String,
    pub endpoint_description: String,
    pub dataset_title: String,
    pub dataset_description: String,
    pub dataset_code: String,
}

/// Stored outcome of one custom query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomQueryResult {
    Rows(Vec<Row>),
    Failed { error: String },
}

impl CustomQueryResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, CustomQueryResult::Failed { .. })
    }
}

/// Everything known about one SPARQL endpoint.
///
/// Metric and histogram fields are `None` until the base battery has run
/// against the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub access_url: String,
    pub status: EndpointStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub names: Vec<NameEntry>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub query_editor_name: String,
    #[serde(default)]
    pub query_editor_additional_information: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triples_amount: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes_amount: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances_amount: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_properties_amount: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_amount: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_subjects_amount: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_unique_subjects_amount: Option<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_properties: Option<Histogram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_classes: Option<Histogram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_reference: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_queries: BTreeMap<String, CustomQueryResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EndpointRecord {
    /// A fresh, not yet probed record.
    pub fn new(access_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            access_url: access_url.into(),
            status: EndpointStatus::Unknown,
            error_message: None,
            names: Vec::new(),
            domains: Vec::new(),
            query_editor_name: String::new(),
            query_editor_additional_information: String::new(),
            triples_amount: None,
            classes_amount: None,
            instances_amount: None,
            used_properties_amount: None,
            properties_amount: None,
            unique_subjects_amount: None,
            average_unique_subjects_amount: None,
            used_properties: None,
            used_classes: None,
            duplicate_reference: None,
            custom_queries: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Placeholder that makes the importer leave this URL alone.
    pub fn placeholder(access_url: impl Into<String>) -> Self {
        Self::new(access_url)
    }

    pub fn is_ok(&self) -> bool {
        self.status == EndpointStatus::Ok
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }

    /// Add a domain; returns false if it was already present.
    pub fn add_domain(&mut self, domain: &str) -> bool {
        if domain.is_empty() || self.has_domain(domain) {
            return false;
        }
        self.domains.push(domain.to_string());
        true
    }

    /// Append a names entry unless an identical one is already recorded.
    pub fn add_name(&mut self, entry: NameEntry) -> bool {
        if self.names.contains(&entry) {
            return false;
        }
        self.names.push(entry);
        true
    }

    pub fn has_custom_query(&self, name: &str) -> bool {
        self.custom_queries.contains_key(name)
    }

    /// Remove custom query results by name; returns how many were present.
    pub fn remove_custom_queries(&mut self, names: &[String]) -> usize {
        names
            .iter()
            .filter(|name| self.custom_queries.remove(name.as_str()).is_some())
            .count()
    }

    /// Mark this record as a mirror of `other_url`.
    pub fn mark_duplicate_of(&mut self, other_url: &str) {
        self.status = EndpointStatus::Duplicate;
        self.duplicate_reference = Some(other_url.to_string());
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in EndpointStatus::ALL {
            assert_eq!(EndpointStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(EndpointStatus::from_str("ok"), None);
        assert_eq!(
            serde_json::to_string(&EndpointStatus::Duplicate).unwrap(),
            "\"DUPLICATE\""
        );
    }

    #[test]
    fn test_domains_only_grow_without_repeats() {
        let mut record = EndpointRecord::new("http://x/sparql");
        assert!(record.add_domain("Government"));
        assert!(!record.add_domain("Government"));
        assert!(!record.add_domain(""));
        assert!(record.add_domain("Life Sciences"));
        assert_eq!(record.domains, vec!["Government", "Life Sciences"]);
    }

    #[test]
    fn test_identical_names_not_repeated() {
        let mut record = EndpointRecord::new("http://x/sparql");
        let entry = NameEntry {
            dataset_code: "d1".to_string(),
            dataset_title: "Dataset one".to_string(),
            ..Default::default()
        };
        assert!(record.add_name(entry.clone()));
        assert!(!record.add_name(entry));
        assert_eq!(record.names.len(), 1);
    }

    #[test]
    fn test_fresh_record_omits_metrics() {
        let record = EndpointRecord::new("http://x/sparql");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("triples_amount").is_none());
        assert!(json.get("used_classes").is_none());
        assert!(record.triples_amount.is_none());
    }

    #[test]
    fn test_remove_custom_queries() {
        let mut record = EndpointRecord::new("http://x/sparql");
        record
            .custom_queries
            .insert("licenses".to_string(), CustomQueryResult::Rows(vec![]));
        record.custom_queries.insert(
            "labels".to_string(),
            CustomQueryResult::Failed {
                error: "timeout".to_string(),
            },
        );
        let removed = record.remove_custom_queries(&["licenses".to_string(), "other".to_string()]);
        assert_eq!(removed, 1);
        assert!(record.has_custom_query("labels"));
        assert!(!record.has_custom_query("licenses"));
    }
}
