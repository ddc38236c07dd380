//! Diesel-based endpoint repository for SQLite.
//!
//! Each record is stored as a JSON document alongside the columns queries
//! filter on. Domains are mirrored into `endpoint_domains`.

use async_trait::async_trait;
use chrono::SecondsFormat;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::pool::{AsyncSqlitePool, DieselError};
use super::util::to_diesel_error;
use super::store::{record_signature, EndpointFilter, EndpointStore, StoreError, SCHEMA_VERSION};
use crate::models::EndpointRecord;
use crate::schema::{endpoint_domains, endpoints};

/// Row of the `endpoints` table.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = endpoints)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EndpointRow {
    pub access_url: String,
    pub status: String,
    pub triples_amount: Option<i64>,
    pub classes_amount: Option<i64>,
    pub signature: Option<String>,
    pub document: String,
    pub schema_version: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl EndpointRow {
    fn from_record(record: &EndpointRecord) -> Result<Self, StoreError> {
        Ok(Self {
            access_url: record.access_url.clone(),
            status: record.status.as_str().to_string(),
            triples_amount: record.triples_amount.map(|m| m.as_legacy_number()),
            classes_amount: record.classes_amount.map(|m| m.as_legacy_number()),
            signature: record_signature(record),
            document: serde_json::to_string(record)?,
            schema_version: SCHEMA_VERSION,
            created_at: record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            updated_at: record.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        })
    }
}

impl TryFrom<EndpointRow> for EndpointRecord {
    type Error = StoreError;

    fn try_from(row: EndpointRow) -> Result<Self, Self::Error> {
        if row.schema_version > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                access_url: row.access_url,
                found: row.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(serde_json::from_str(&row.document)?)
    }
}

fn filtered<'a>(filter: &EndpointFilter) -> endpoints::BoxedQuery<'a, Sqlite> {
    let mut query = endpoints::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(endpoints::status.eq(status.as_str()));
    }
    if let Some(domain) = filter.domain.clone() {
        query = query.filter(
            endpoints::access_url.eq_any(
                endpoint_domains::table
                    .filter(endpoint_domains::domain.eq(domain))
                    .select(endpoint_domains::access_url),
            ),
        );
    }
    query
}

/// SQLite endpoint store.
#[derive(Clone)]
pub struct DieselEndpointRepository {
    pool: AsyncSqlitePool,
}

impl DieselEndpointRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EndpointStore for DieselEndpointRepository {
    async fn upsert(&self, record: &EndpointRecord) -> Result<(), StoreError> {
        let row = EndpointRow::from_record(record)?;
        let domains = record.domains.clone();
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, DieselError, _>(move |conn| {
            async move {
                diesel::replace_into(endpoints::table)
                    .values(&row)
                    .execute(conn)
                    .await?;

                diesel::delete(
                    endpoint_domains::table.filter(endpoint_domains::access_url.eq(&row.access_url)),
                )
                .execute(conn)
                .await?;

                for domain in &domains {
                    diesel::insert_or_ignore_into(endpoint_domains::table)
                        .values((
                            endpoint_domains::access_url.eq(&row.access_url),
                            endpoint_domains::domain.eq(domain),
                        ))
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        Ok(())
    }

    async fn get(&self, access_url: &str) -> Result<Option<EndpointRecord>, StoreError> {
        let mut conn = self.pool.get().await?;

        endpoints::table
            .find(access_url)
            .first::<EndpointRow>(&mut conn)
            .await
            .optional()?
            .map(EndpointRecord::try_from)
            .transpose()
    }

    async fn find_by_signature(
        &self,
        signature: &str,
        exclude_url: &str,
    ) -> Result<Option<EndpointRecord>, StoreError> {
        let mut conn = self.pool.get().await?;

        endpoints::table
            .filter(endpoints::signature.eq(signature))
            .filter(endpoints::access_url.ne(exclude_url))
            .order((endpoints::created_at.asc(), endpoints::access_url.asc()))
            .first::<EndpointRow>(&mut conn)
            .await
            .optional()?
            .map(EndpointRecord::try_from)
            .transpose()
    }

    async fn find(&self, filter: &EndpointFilter) -> Result<Vec<EndpointRecord>, StoreError> {
        let mut conn = self.pool.get().await?;

        filtered(filter)
            .order((endpoints::created_at.asc(), endpoints::access_url.asc()))
            .load::<EndpointRow>(&mut conn)
            .await?
            .into_iter()
            .map(EndpointRecord::try_from)
            .collect()
    }

    async fn domains(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pool.get().await?;

        Ok(endpoint_domains::table
            .select(endpoint_domains::domain)
            .distinct()
            .order(endpoint_domains::domain.desc())
            .load::<String>(&mut conn)
            .await?)
    }

    async fn delete(&self, access_url: &str) -> Result<bool, StoreError> {
        let url = access_url.to_string();
        let mut conn = self.pool.get().await?;

        let rows = conn
            .transaction::<_, DieselError, _>(move |conn| {
                async move {
                    diesel::delete(
                        endpoint_domains::table.filter(endpoint_domains::access_url.eq(&url)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(endpoints::table.find(&url))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await?;

        Ok(rows > 0)
    }

    async fn delete_fields(&self, names: &[String]) -> Result<usize, StoreError> {
        let mut changed = 0;
        for mut record in self.find(&EndpointFilter::all()).await? {
            if record.remove_custom_queries(names) > 0 {
                record.touch();
                self.upsert(&record).await?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn drop_collection(&self) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let rows = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    diesel::delete(endpoint_domains::table).execute(conn).await?;
                    diesel::delete(endpoints::table).execute(conn).await
                }
                .scope_boxed()
            })
            .await?;

        Ok(rows)
    }

    async fn count(&self, filter: &EndpointFilter) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = filtered(filter).count().get_result(&mut conn).await?;
        Ok(usize::try_from(count).map_err(to_diesel_error)?)
    }
}
