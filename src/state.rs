use std::sync::Arc;

use crate::services::{fares::FareSource, storage::StorageService, store::TripStore};

/// Everything one interactive run works with. Starts with an empty store.
#[derive(Clone)]
pub struct Session {
    pub store: TripStore,
    pub storage: StorageService,
    pub fares: Arc<dyn FareSource>,
}

impl Session {
    pub fn new(storage: StorageService, fares: Arc<dyn FareSource>) -> Self {
        Self {
            store: TripStore::new(),
            storage,
            fares,
        }
    }
}
