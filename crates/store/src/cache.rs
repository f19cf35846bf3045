//! Read-through cache of the full dataset.
//!
//! The first [`DatasetCache::dataset`] call scans the store; later calls
//! hand out the same shared slice until [`DatasetCache::reload`] or
//! [`DatasetCache::invalidate`] is called.

use campaign_core::types::PerformanceRecord;
use campaign_core::InsightsResult;
use std::sync::Arc;
use tracing::info;

use crate::sqlite::MarketingStore;

pub struct DatasetCache {
    store: MarketingStore,
    dataset: Option<Arc<[PerformanceRecord]>>,
}

impl DatasetCache {
    pub fn new(store: MarketingStore) -> Self {
        Self {
            store,
            dataset: None,
        }
    }

    pub fn store(&self) -> &MarketingStore {
        &self.store
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn dataset(&mut self) -> InsightsResult<Arc<[PerformanceRecord]>> {
        if let Some(dataset) = &self.dataset {
            return Ok(Arc::clone(dataset));
        }
        self.reload()
    }

    /// Re-read the store and replace the cached copy.
    pub fn reload(&mut self) -> InsightsResult<Arc<[PerformanceRecord]>> {
        let dataset: Arc<[PerformanceRecord]> = self.store.load_all()?.into();
        info!(rows = dataset.len(), "Dataset cache loaded");
        self.dataset = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn invalidate(&mut self) {
        self.dataset = None;
    }
}
