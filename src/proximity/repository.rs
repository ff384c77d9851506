use std::collections::BTreeSet;
use std::sync::Arc;

use super::errors::QueryError;
use super::store::RegionStore;
use crate::models::{Region, RegionId};

// ============================================================================
// Region Repository
// ============================================================================
//
// Batches every requested id into one lookup instead of one round trip per id.
//
// ============================================================================

pub struct RegionRepository {
    store: Arc<dyn RegionStore>,
}

impl RegionRepository {
    pub fn new(store: Arc<dyn RegionStore>) -> Self {
        Self { store }
    }

    /// Fetch the records for `ids`. Unknown ids are simply absent from the
    /// result; an empty input never touches the store.
    pub async fn fetch(&self, ids: &[RegionId]) -> Result<Vec<Region>, QueryError> {
        let unique: Vec<RegionId> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        if unique.is_empty() {
            return Ok(Vec::new());
        }

        self.store.regions_by_ids(&unique).await
    }
}
