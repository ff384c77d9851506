// ============================================================================
// Proximity Event Resolution
// ============================================================================
//
// Finds upcoming events near a region:
// - store       - RegionStore trait + Postgres implementation
// - expander    - region → every region in the same province
// - repository  - batched region record lookup
// - query       - ranking by (start time, distance), page cut
// - errors      - QueryError taxonomy
//
// ============================================================================

pub mod errors;
pub mod expander;
pub mod query;
pub mod repository;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::QueryError;
pub use expander::{RegionExpander, RegionSet};
pub use query::{rank_events, start_of_day, GetTournamentsByLocationCommand, ProximityEventQuery};
pub use repository::RegionRepository;
pub use store::{PgRegionStore, RegionStore};
