//! Query texts for the analytical battery.
//!
//! Each measurement is a ladder of variants ordered from most precise to
//! most conservative. See [`super::ladder`] for how they are tried.

use crate::models::LISTING_LIMIT;

/// Trivial bounded query used as the connectivity test.
pub const CONNECTIVITY_QUERY: &str = "SELECT * WHERE { ?s ?p ?o } LIMIT 10";

/// How the rows of a variant are turned into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// The count is bound to `var` in the first row.
    Aggregate { var: &'static str },
    /// The number of rows stands in for the count.
    RowCount,
}

/// One rung of a fallback ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryVariant {
    pub label: &'static str,
    pub query: String,
    pub reading: Reading,
    /// Row limit applied by the query, if any.
    pub limit: Option<u64>,
}

impl QueryVariant {
    pub fn aggregate(label: &'static str, var: &'static str, query: impl Into<String>) -> Self {
        Self {
            label,
            query: query.into(),
            reading: Reading::Aggregate { var },
            limit: None,
        }
    }

    pub fn listing(label: &'static str, query: impl Into<String>) -> Self {
        Self {
            label,
            query: query.into(),
            reading: Reading::RowCount,
            limit: None,
        }
    }

    /// Same query with a hard row limit appended.
    pub fn limited(&self, label: &'static str, limit: u64) -> Self {
        Self {
            label,
            query: format!("{} LIMIT {}", self.query, limit),
            reading: self.reading,
            limit: Some(limit),
        }
    }
}

/// Ladder for a single number.
#[derive(Debug, Clone)]
pub struct CountLadder {
    pub metric: &'static str,
    pub variants: Vec<QueryVariant>,
}

impl CountLadder {
    /// Aggregate, then plain listing, then limited listing.
    fn standard(
        metric: &'static str,
        var: &'static str,
        aggregate: &str,
        listing: &str,
    ) -> Self {
        let listing = QueryVariant::listing("listing", listing);
        let limited = listing.limited("limited listing", LISTING_LIMIT);
        Self {
            metric,
            variants: vec![QueryVariant::aggregate("aggregate", var, aggregate), listing, limited],
        }
    }
}

/// Ladder for a usage histogram.
#[derive(Debug, Clone)]
pub struct HistogramLadder {
    pub metric: &'static str,
    pub name_var: &'static str,
    pub amount_var: &'static str,
    pub variants: Vec<QueryVariant>,
}

impl HistogramLadder {
    fn grouped(
        metric: &'static str,
        name_var: &'static str,
        amount_var: &'static str,
        query: String,
    ) -> Self {
        let grouped = QueryVariant::listing("grouped", query);
        let limited = grouped.limited("limited grouped", LISTING_LIMIT);
        Self {
            metric,
            name_var,
            amount_var,
            variants: vec![grouped, limited],
        }
    }
}

pub fn triples() -> CountLadder {
    CountLadder::standard(
        "triples",
        "triplesAmount",
        "SELECT (COUNT(*) AS ?triplesAmount) WHERE { ?s ?p ?o }",
        "SELECT ?s WHERE { ?s ?p ?o }",
    )
}

pub fn instances() -> CountLadder {
    CountLadder::standard(
        "instances",
        "instancesAmount",
        "SELECT (COUNT(?s) AS ?instancesAmount) WHERE { ?s a ?class }",
        "SELECT ?s WHERE { ?s a ?class }",
    )
}

pub fn unique_subjects() -> CountLadder {
    CountLadder::standard(
        "unique subjects",
        "subjectsAmount",
        "SELECT (COUNT(DISTINCT ?s) AS ?subjectsAmount) WHERE { ?s ?p ?o }",
        "SELECT DISTINCT ?s WHERE { ?s ?p ?o }",
    )
}

pub fn classes_count() -> CountLadder {
    CountLadder::standard(
        "classes",
        "classesAmount",
        "SELECT (COUNT(DISTINCT ?class) AS ?classesAmount) WHERE { ?s a ?class }",
        "SELECT DISTINCT ?class WHERE { ?s a ?class }",
    )
}

pub fn properties_count() -> CountLadder {
    CountLadder::standard(
        "used properties",
        "propertiesAmount",
        "SELECT (COUNT(DISTINCT ?property) AS ?propertiesAmount) WHERE { ?s ?property ?o }",
        "SELECT DISTINCT ?property WHERE { ?s ?property ?o }",
    )
}

pub fn used_classes() -> HistogramLadder {
    HistogramLadder::grouped(
        "class usage",
        "class",
        "classAmount",
        "SELECT ?class (COUNT(?instance) AS ?classAmount) \
         WHERE { ?instance a ?class } \
         GROUP BY ?class ORDER BY DESC(?classAmount)"
            .to_string(),
    )
}

pub fn used_properties() -> HistogramLadder {
    HistogramLadder::grouped(
        "property usage",
        "property",
        "propAmount",
        "SELECT ?property (COUNT(?s) AS ?propAmount) \
         WHERE { ?s ?property ?o } \
         GROUP BY ?property ORDER BY DESC(?propAmount)"
            .to_string(),
    )
}
