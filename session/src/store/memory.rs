use async_trait::async_trait;
use corelib::PerUserReservationCache;
use parking_lot::Mutex;

use super::ReservationStore;

/// Process-local store; contents are lost on exit.
#[derive(Default)]
pub struct InMemoryReservationStore {
    cache: Mutex<PerUserReservationCache>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn get(&self) -> anyhow::Result<PerUserReservationCache> {
        Ok(self.cache.lock().clone())
    }

    async fn set(&self, cache: &PerUserReservationCache) -> anyhow::Result<()> {
        *self.cache.lock() = cache.clone();
        Ok(())
    }
}
