//! LOD Cloud manifest structure.
//!
//! The manifest maps dataset codes to dataset descriptors. Only the fields
//! needed to find and describe SPARQL endpoints are modelled; everything
//! else in the published file is ignored.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::endpoint::NameEntry;

/// Manifest keyed by dataset code, in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub datasets: IndexMap<String, DatasetDescriptor>,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Text that is either plain or keyed by language tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    /// English text if present, otherwise the first available language.
    pub fn preferred(&self) -> &str {
        match self {
            LocalizedText::Plain(s) => s,
            LocalizedText::Localized(map) => map
                .get("en")
                .or_else(|| map.values().next())
                .map(|s| s.as_str())
                .unwrap_or(""),
        }
    }
}

/// One dataset entry of the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub sparql: Vec<ManifestResource>,
    #[serde(default)]
    pub other_download: Vec<ManifestResource>,
}

/// A declared SPARQL endpoint or another download of a dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestResource {
    #[serde(default)]
    pub access_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
}

/// Why an "other download" is treated as a queryable endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// An "other download" whose text mentions SPARQL.
    Sparql,
    /// An "other download" whose text mentions VoID.
    Void,
}

impl ManifestResource {
    fn text(&self) -> String {
        let mut text = self.title.clone().unwrap_or_default();
        if let Some(description) = &self.description {
            text.push(' ');
            text.push_str(description.preferred());
        }
        text.to_lowercase()
    }

    /// Classify an "other download" entry as endpoint-like, if it is one.
    pub fn other_download_kind(&self) -> Option<EndpointKind> {
        let text = self.text();
        if text.contains("sparql") {
            Some(EndpointKind::Sparql)
        } else if text.contains("void") {
            Some(EndpointKind::Void)
        } else {
            None
        }
    }

    /// Non-empty access URL.
    pub fn url(&self) -> Option<&str> {
        self.access_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// Dataset metadata carried into the processing of each of its endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetContext {
    pub code: String,
    pub title: String,
    pub description: String,
    pub domain: Option<String>,
}

impl DatasetContext {
    pub fn new(code: &str, dataset: &DatasetDescriptor) -> Self {
        Self {
            code: code.to_string(),
            title: dataset.title.clone().unwrap_or_default(),
            description: dataset
                .description
                .as_ref()
                .map(|d| d.preferred().to_string())
                .unwrap_or_default(),
            domain: dataset
                .domain
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }

    /// Names entry for one endpoint of this dataset. The endpoint title
    /// falls back to the dataset title.
    pub fn name_entry(&self, resource: &ManifestResource) -> NameEntry {
        let endpoint_title = resource
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title)
            .to_string();
        NameEntry {
            endpoint_title,
            endpoint_description: resource
                .description
                .as_ref()
                .map(|d| d.preferred().to_string())
                .unwrap_or_default(),
            dataset_title: self.title.clone(),
            dataset_description: self.description.clone(),
            dataset_code: self.code.clone(),
        }
    }

    pub fn domains(&self) -> Vec<String> {
        self.domain.iter().cloned().collect()
    }
}
