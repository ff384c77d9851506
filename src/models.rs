use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Reference Data
// ============================================================================

pub type RegionId = i32;

/// Administrative region with coordinates and its parent province.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub province: String,
}

impl Region {
    pub fn reference_point(&self) -> ReferencePoint {
        ReferencePoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Anchor for distance computations.
///
/// Distances are plain Euclidean in latitude/longitude degree-space, not
/// geodesic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl ReferencePoint {
    pub fn distance_to(&self, latitude: f64, longitude: f64) -> f64 {
        let d_lon = longitude - self.longitude;
        let d_lat = latitude - self.latitude;
        (d_lon * d_lon + d_lat * d_lat).sqrt()
    }
}

/// Rounds a distance to 4 decimal places, ties to even.
pub fn round_distance(distance: f64) -> f64 {
    (distance * 10_000.0).round_ties_even() / 10_000.0
}

// ============================================================================
// Events & Addresses
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    pub name: String,
    pub description: String,
    pub region: RegionId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub link_id: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Address {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Read-only projection of an event joined with its address and the distance
/// from the caller's reference point.
#[derive(Serialize, Clone, Debug, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AddressEventResult {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance: f64,
    pub event_name: String,
    pub event_description: String,
    pub region: RegionId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub link_id: i32,
}

impl AddressEventResult {
    pub fn from_parts(event: &Event, address: &Address, distance: f64) -> Self {
        Self {
            address: address.address.clone(),
            latitude: address.latitude,
            longitude: address.longitude,
            distance,
            event_name: event.name.clone(),
            event_description: event.description.clone(),
            region: event.region,
            start_time: event.start_time,
            end_time: event.end_time,
            link_id: event.link_id,
        }
    }
}
