use std::collections::BTreeSet;
use std::sync::Arc;

use super::errors::QueryError;
use super::store::RegionStore;
use crate::models::RegionId;

/// Regions related to an origin: every region in the origin's province plus
/// the origin itself, each exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    origin: RegionId,
    ids: BTreeSet<RegionId>,
}

impl RegionSet {
    pub fn new(origin: RegionId, siblings: impl IntoIterator<Item = RegionId>) -> Self {
        let mut ids: BTreeSet<RegionId> = siblings.into_iter().collect();
        ids.insert(origin);
        Self { origin, ids }
    }

    pub fn origin(&self) -> RegionId {
        self.origin
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn to_vec(&self) -> Vec<RegionId> {
        self.ids.iter().copied().collect()
    }
}

pub struct RegionExpander {
    store: Arc<dyn RegionStore>,
}

impl RegionExpander {
    pub fn new(store: Arc<dyn RegionStore>) -> Self {
        Self { store }
    }

    /// Resolve the province-mates of `region_id`.
    ///
    /// Fails with [`QueryError::NotFound`] when the region does not exist.
    pub async fn expand(&self, region_id: RegionId) -> Result<RegionSet, QueryError> {
        let siblings = self
            .store
            .province_siblings(region_id)
            .await?
            .ok_or(QueryError::NotFound(region_id))?;

        let set = RegionSet::new(region_id, siblings);

        tracing::debug!(
            region_id = region_id,
            related = set.len(),
            "Expanded region to province"
        );

        Ok(set)
    }
}
