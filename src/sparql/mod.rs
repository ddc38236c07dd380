//! SPARQL protocol access: transport, result parsing and fallback ladders.

pub mod executor;
pub mod ladder;
pub mod queries;
mod results;
mod transport;

pub use executor::QueryExecutor;
pub use queries::{CountLadder, HistogramLadder, QueryVariant, Reading, CONNECTIVITY_QUERY};
pub use results::{first_integer, integer_binding, QueryResults, RdfTerm, Row};
pub use transport::{QueryError, SparqlTransport};
