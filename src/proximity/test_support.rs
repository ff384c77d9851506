//! In-memory `RegionStore` used by the proximity and HTTP tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::QueryError;
use super::store::RegionStore;
use crate::models::{Address, AddressEventResult, Event, ReferencePoint, Region, RegionId};

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

pub fn region(id: RegionId, name: &str, province: &str, latitude: f64, longitude: f64) -> Region {
    Region {
        id,
        name: name.to_string(),
        latitude,
        longitude,
        province: province.to_string(),
    }
}

pub fn event_at(link_id: i32, region: RegionId, start: &str, latitude: f64, longitude: f64) -> (Event, Address) {
    let start_time = at(start);
    (
        Event {
            name: format!("Event {link_id}"),
            description: format!("Description {link_id}"),
            region,
            start_time,
            end_time: start_time + chrono::Duration::hours(6),
            link_id,
        },
        Address {
            address: format!("{link_id} Venue Street"),
            latitude,
            longitude,
        },
    )
}

/// Tokyo(10), Kanagawa(11) and Saitama(12) share "Kanto"; Osaka(20) is in "Kansai".
pub fn kanto_kansai_store() -> InMemoryRegionStore {
    InMemoryRegionStore::new(vec![
        region(10, "Tokyo", "Kanto", 35.68, 139.69),
        region(11, "Kanagawa", "Kanto", 35.45, 139.64),
        region(12, "Saitama", "Kanto", 35.86, 139.65),
        region(20, "Osaka", "Kansai", 34.69, 135.50),
    ])
}

#[derive(Default)]
pub struct InMemoryRegionStore {
    regions: Vec<Region>,
    events: Vec<(Event, Address)>,
    hidden: Vec<RegionId>,
    unavailable: bool,
    region_lookups: AtomicUsize,
}

impl InMemoryRegionStore {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn with_event(mut self, (event, address): (Event, Address)) -> Self {
        self.events.push((event, address));
        self
    }

    /// Keep the region in province joins but leave it out of record lookups.
    pub fn hiding_record(mut self, id: RegionId) -> Self {
        self.hidden.push(id);
        self
    }

    pub fn region_lookups(&self) -> usize {
        self.region_lookups.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), QueryError> {
        if self.unavailable {
            return Err(QueryError::StoreUnavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

// Mirrors the PgRegionStore contract: an unknown origin yields `None` (the
// LEFT JOIN returns zero rows), a known origin without province-mates yields
// `Some(vec![])`, and the origin never lists itself as a sibling.
#[async_trait]
impl RegionStore for InMemoryRegionStore {
    async fn province_siblings(&self, region_id: RegionId) -> Result<Option<Vec<RegionId>>, QueryError> {
        self.check_available()?;

        let Some(origin) = self.regions.iter().find(|r| r.id == region_id) else {
            return Ok(None);
        };

        Ok(Some(
            self.regions
                .iter()
                .filter(|r| r.province == origin.province && r.id != region_id)
                .map(|r| r.id)
                .collect(),
        ))
    }

    async fn regions_by_ids(&self, ids: &[RegionId]) -> Result<Vec<Region>, QueryError> {
        self.check_available()?;
        self.region_lookups.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .regions
            .iter()
            .filter(|r| ids.contains(&r.id) && !self.hidden.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn upcoming_events(
        &self,
        region_ids: &[RegionId],
        reference: ReferencePoint,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<AddressEventResult>, QueryError> {
        self.check_available()?;

        let mut rows: Vec<AddressEventResult> = self
            .events
            .iter()
            .filter(|(event, _)| region_ids.contains(&event.region) && event.start_time >= since)
            .map(|(event, address)| {
                let distance = reference.distance_to(address.latitude, address.longitude);
                AddressEventResult::from_parts(event, address, distance)
            })
            .collect();

        rows.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.distance.total_cmp(&b.distance))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(rows)
    }
}
