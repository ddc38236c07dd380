//! Metadata scraped from an endpoint's HTML landing page.

use std::time::Duration;

use scraper::{Html, Selector};

/// Server products recognised from the page title, with the name stored
/// for each.
const KNOWN_PRODUCTS: &[(&str, &str)] = &[
    ("virtuoso", "Virtuoso"),
    ("fuseki", "Fuseki"),
    ("graphdb", "GraphDB"),
    ("blazegraph", "Blazegraph"),
    ("stardog", "Stardog"),
    ("rdf4j", "RDF4J"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandingPage {
    /// Normalized product name if recognised, otherwise the raw title.
    pub query_editor_name: String,
    /// Footer text of a recognised product page.
    pub additional_information: String,
    /// Maximum query timeout advertised by the query form.
    pub timeout: Option<Duration>,
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn select_first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

impl LandingPage {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut page = LandingPage::default();

        if let Some(title) = select_first_text(&document, "title") {
            let lower = title.to_lowercase();
            match KNOWN_PRODUCTS.iter().find(|(needle, _)| lower.contains(needle)) {
                Some((_, product)) => {
                    page.query_editor_name = product.to_string();
                    page.additional_information = select_first_text(&document, "#footer")
                        .map(|footer| normalize_whitespace(&footer))
                        .unwrap_or_default();
                }
                None => page.query_editor_name = title.trim().to_string(),
            }
        }

        page.timeout = Selector::parse("#timeout")
            .ok()
            .and_then(|selector| {
                document
                    .select(&selector)
                    .next()
                    .and_then(|el| el.value().attr("max"))
                    .and_then(|max| max.trim().parse::<u64>().ok())
            })
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        page
    }
}
