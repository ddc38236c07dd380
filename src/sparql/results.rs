//! SPARQL 1.1 query results JSON format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One bound RDF term of a result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfTerm {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, rename = "xml:lang", skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl RdfTerm {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

/// A result row: variable name to bound term. Unbound variables are absent.
pub type Row = BTreeMap<String, RdfTerm>;

#[derive(Debug, Deserialize)]
struct Bindings {
    #[serde(default)]
    bindings: Vec<Row>,
}

/// Top-level results document for SELECT and ASK queries.
#[derive(Debug, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    results: Option<Bindings>,
    #[serde(default)]
    boolean: Option<bool>,
}

impl QueryResults {
    /// Rows of a SELECT result; an ASK result becomes one row binding
    /// `boolean`. None when the document is neither.
    pub fn into_rows(self) -> Option<Vec<Row>> {
        if let Some(results) = self.results {
            return Some(results.bindings);
        }
        self.boolean.map(|b| {
            let mut row = Row::new();
            row.insert("boolean".to_string(), RdfTerm::literal(b.to_string()));
            vec![row]
        })
    }
}

/// Read an integer bound to `var` in a row.
///
/// Endpoints return counts as typed or plain literals, sometimes in
/// decimal notation ("42.0").
pub fn integer_binding(row: &Row, var: &str) -> Option<u64> {
    let value = row.get(var)?.value.trim();
    value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}

/// Read the first bound value of a row, whatever the variable name.
pub fn first_integer(row: &Row) -> Option<u64> {
    row.keys().find_map(|var| integer_binding(row, var))
}
