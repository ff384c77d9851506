use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::QueryError;
use super::expander::RegionExpander;
use super::repository::RegionRepository;
use super::store::RegionStore;
use crate::models::{round_distance, AddressEventResult, Region, RegionId};

/// Request for upcoming events around a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTournamentsByLocationCommand {
    pub region_id: RegionId,
    pub per_page: i32,
}

// ============================================================================
// Proximity Event Query
// ============================================================================
//
// region id → province-mates → reference coordinates → upcoming events
// ranked by (start time, distance) and cut to one page.
//
// ============================================================================

pub struct ProximityEventQuery {
    expander: RegionExpander,
    repository: RegionRepository,
    store: Arc<dyn RegionStore>,
}

impl ProximityEventQuery {
    pub fn new(store: Arc<dyn RegionStore>) -> Self {
        Self {
            expander: RegionExpander::new(store.clone()),
            repository: RegionRepository::new(store.clone()),
            store,
        }
    }

    /// Upcoming events near `command.region_id`, starting from today.
    ///
    /// `page_number` is accepted for API compatibility but has no effect:
    /// only the first `per_page` results are ever returned.
    pub async fn query(
        &self,
        command: &GetTournamentsByLocationCommand,
        page_number: u32,
    ) -> Result<Vec<AddressEventResult>, QueryError> {
        self.query_since(command, page_number, start_of_day(Utc::now())).await
    }

    pub async fn query_since(
        &self,
        command: &GetTournamentsByLocationCommand,
        _page_number: u32,
        since: DateTime<Utc>,
    ) -> Result<Vec<AddressEventResult>, QueryError> {
        if command.region_id == 0 {
            return Err(QueryError::InvalidArgument("region id must be set"));
        }
        let per_page = usize::try_from(command.per_page)
            .map_err(|_| QueryError::InvalidArgument("per page must not be negative"))?;

        let related = self.expander.expand(command.region_id).await?;
        let records = self.repository.fetch(&related.to_vec()).await?;

        let reference = records
            .iter()
            .find(|r| r.id == command.region_id)
            .map(Region::reference_point)
            .ok_or(QueryError::ReferenceNotFound(command.region_id))?;

        let region_ids: Vec<RegionId> = records.iter().map(|r| r.id).collect();

        let rows = self
            .store
            .upcoming_events(&region_ids, reference, since, i64::from(command.per_page))
            .await?;

        let ranked = rank_events(rows, per_page)?;

        tracing::info!(
            region_id = command.region_id,
            related_regions = region_ids.len(),
            results = ranked.len(),
            "Resolved events by location"
        );

        Ok(ranked)
    }
}

/// Round distances, order by (start time, distance) and keep `per_page` rows.
pub fn rank_events(
    mut rows: Vec<AddressEventResult>,
    per_page: usize,
) -> Result<Vec<AddressEventResult>, QueryError> {
    for row in rows.iter_mut() {
        if !row.distance.is_finite() {
            return Err(QueryError::Unexpected(
                format!("non-finite distance for event {}", row.link_id).into(),
            ));
        }
        row.distance = round_distance(row.distance);
    }

    rows.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.distance.total_cmp(&b.distance))
    });
    rows.truncate(per_page);

    Ok(rows)
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
