//! Fallback ladders.
//!
//! A ladder is an ordered list of [`QueryVariant`]s. Variants are run in
//! order and the first one whose rows can be interpreted wins. An empty
//! result set counts as a failed rung.

use tracing::debug;

use super::executor::QueryExecutor;
use super::queries::QueryVariant;
use super::results::Row;
use super::transport::QueryError;

/// Run `variants` until one succeeds, interpreting its rows with
/// `interpret`. Returns the interpreted value or the last failure.
pub async fn first_success<T, F>(
    executor: &QueryExecutor<'_>,
    metric: &str,
    variants: &[QueryVariant],
    interpret: F,
) -> Result<T, QueryError>
where
    F: Fn(&QueryVariant, Vec<Row>) -> Result<T, QueryError>,
{
    let mut last_error: Option<QueryError> = None;

    for variant in variants {
        let outcome = match executor.execute(&variant.query).await {
            Ok(rows) if rows.is_empty() => Err(QueryError::Empty),
            Ok(rows) => interpret(variant, rows),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => {
                debug!("{} succeeded with {} variant", metric, variant.label);
                return Ok(value);
            }
            Err(e) => {
                debug!("{} {} variant failed: {}", metric, variant.label, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(QueryError::NoVariants))
}
