//! Repository layer for endpoint persistence.
//!
//! All database access uses Diesel over SQLite behind the
//! [`EndpointStore`] trait.

mod endpoint;
mod pool;
mod store;
mod util;

pub use endpoint::{DieselEndpointRepository, EndpointRow};
pub use pool::{AsyncSqlitePool, AsyncSqliteConnection, DieselError};
pub use store::{record_signature, EndpointFilter, EndpointStore, StoreError, SCHEMA_VERSION};
