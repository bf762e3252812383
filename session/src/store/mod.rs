pub mod memory;
pub mod sqlite_store;

use corelib::PerUserReservationCache;

pub use memory::InMemoryReservationStore;
pub use sqlite_store::SQLiteReservationStore;

/// Opaque get/set persistence for the per-user reservation cache.
#[async_trait::async_trait]
pub trait ReservationStore: Send + Sync {
    /// The whole cache; empty when nothing was stored yet.
    async fn get(&self) -> anyhow::Result<PerUserReservationCache>;
    /// Replace the whole cache.
    async fn set(&self, cache: &PerUserReservationCache) -> anyhow::Result<()>;
}
