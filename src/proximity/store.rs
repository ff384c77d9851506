use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::errors::QueryError;
use crate::models::{AddressEventResult, ReferencePoint, Region, RegionId};

// ============================================================================
// Region Store - read-only access to regions, events and addresses
// ============================================================================
//
// Every call acquires one pooled connection and hands it back when the call
// returns, on the success, empty and error paths alike.
//
// ============================================================================

#[async_trait]
pub trait RegionStore: Send + Sync {
    /// Ids of every other region sharing the origin's province.
    ///
    /// Returns `None` when the origin region does not exist.
    async fn province_siblings(&self, region_id: RegionId) -> Result<Option<Vec<RegionId>>, QueryError>;

    /// Region records for `ids`, looked up in a single round trip.
    async fn regions_by_ids(&self, ids: &[RegionId]) -> Result<Vec<Region>, QueryError>;

    /// Events in `region_ids` starting at or after `since`, with the raw
    /// (unrounded) distance of their address from `reference`, ordered by
    /// start time then distance and limited to `limit` rows.
    async fn upcoming_events(
        &self,
        region_ids: &[RegionId],
        reference: ReferencePoint,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<AddressEventResult>, QueryError>;
}

pub struct PgRegionStore {
    pool: PgPool,
}

impl PgRegionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegionStore for PgRegionStore {
    async fn province_siblings(&self, region_id: RegionId) -> Result<Option<Vec<RegionId>>, QueryError> {
        let mut conn = self.pool.acquire().await?;

        // LEFT JOIN keeps one row (with a NULL sibling) for an origin that
        // has no siblings, so zero rows means the origin itself is missing.
        let rows: Vec<Option<RegionId>> = sqlx::query_scalar(
            r#"
            SELECT r2.id
            FROM regions r1
            LEFT JOIN regions r2
                ON r2.province = r1.province
               AND r2.id <> r1.id
            WHERE r1.id = $1
            "#,
        )
        .bind(region_id)
        .fetch_all(&mut *conn)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(rows.into_iter().flatten().collect()))
    }

    async fn regions_by_ids(&self, ids: &[RegionId]) -> Result<Vec<Region>, QueryError> {
        let mut conn = self.pool.acquire().await?;

        let regions = sqlx::query_as::<_, Region>(
            r#"
            SELECT id, name, latitude, longitude, province
            FROM regions
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(regions)
    }

    async fn upcoming_events(
        &self,
        region_ids: &[RegionId],
        reference: ReferencePoint,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<AddressEventResult>, QueryError> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, AddressEventResult>(
            r#"
            SELECT
                a.address, a.latitude, a.longitude,
                e.event_name, e.event_description, e.region,
                e.start_time, e.end_time, e.link_id,
                SQRT(
                    POWER(a.longitude - $2, 2) + POWER(a.latitude - $3, 2)
                ) AS distance
            FROM events e
            JOIN addresses a ON e.address_id = a.id
            WHERE e.region = ANY($1)
              AND e.start_time >= $4
            ORDER BY e.start_time ASC, distance ASC
            LIMIT $5
            "#,
        )
        .bind(region_ids)
        .bind(reference.longitude)
        .bind(reference.latitude)
        .bind(since)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        tracing::debug!(
            region_count = region_ids.len(),
            row_count = rows.len(),
            "Fetched upcoming events"
        );

        Ok(rows)
    }
}
