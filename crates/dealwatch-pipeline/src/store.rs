//! In-memory deal collections, one per platform.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use dealwatch_core::{DealRecord, Platform};

/// Last completed collection per platform.
///
/// Collections are immutable `Arc<[DealRecord]>` snapshots: `replace` swaps
/// the pointer under a short write lock, so a reader holds either the old or
/// the new collection in full and never observes a partial write.
#[derive(Debug, Default)]
pub struct DealStore {
    collections: RwLock<HashMap<Platform, Arc<[DealRecord]>>>,
}

impl DealStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current collection for `platform`; empty if no job has completed.
    #[must_use]
    pub fn read(&self, platform: Platform) -> Arc<[DealRecord]> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        collections
            .get(&platform)
            .map_or_else(|| Arc::from(Vec::new()), Arc::clone)
    }

    /// Replaces the whole collection for `platform` and returns the new
    /// snapshot.
    pub fn replace(&self, platform: Platform, deals: Vec<DealRecord>) -> Arc<[DealRecord]> {
        let snapshot: Arc<[DealRecord]> = Arc::from(deals);
        drop(self.swap(platform, Arc::clone(&snapshot)));
        snapshot
    }

    /// Installs `snapshot` and hands back the previous collection. The write
    /// guard is released before returning, so the old collection is freed
    /// by the caller outside the lock.
    fn swap(&self, platform: Platform, snapshot: Arc<[DealRecord]>) -> Option<Arc<[DealRecord]>> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        collections.insert(platform, snapshot)
    }
}
