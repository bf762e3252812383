use corelib::{PerUserReservationCache, Reservation, ReservationList};
use session::ReservationStore;
use session::store::SQLiteReservationStore;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Fresh in-memory database per test. A single long-lived connection keeps
/// the database alive for the whole test.
async fn pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

fn cache_for(user: &str, cells: &[&str]) -> PerUserReservationCache {
    let mut cache = PerUserReservationCache::new();
    cache.insert(
        user.into(),
        ReservationList {
            list: vec![Reservation::from_cells(cells.iter().map(|c| Some(*c)))],
        },
    );
    cache
}

#[tokio::test]
async fn empty_namespace_reads_as_empty_cache() {
    let store = SQLiteReservationStore::from_pool(pool().await, "siso")
        .await
        .unwrap();
    assert!(store.get().await.unwrap().is_empty());
}

#[tokio::test]
async fn set_then_get_returns_same_cache() {
    let store = SQLiteReservationStore::from_pool(pool().await, "siso")
        .await
        .unwrap();
    let cache = cache_for("u1", &["1", "풋살장", "2026-12-01"]);

    store.set(&cache).await.unwrap();
    assert_eq!(store.get().await.unwrap(), cache);
}

#[tokio::test]
async fn set_replaces_previous_document() {
    let store = SQLiteReservationStore::from_pool(pool().await, "siso")
        .await
        .unwrap();

    store.set(&cache_for("u1", &["a"])).await.unwrap();
    store.set(&cache_for("u2", &["b"])).await.unwrap();

    let got = store.get().await.unwrap();
    assert!(!got.contains_key("u1"));
    assert_eq!(got["u2"].list[0].column(0), Some("b"));
}

#[tokio::test]
async fn namespaces_are_isolated() {
    let pool = pool().await;
    let a = SQLiteReservationStore::from_pool(pool.clone(), "a")
        .await
        .unwrap();
    let b = SQLiteReservationStore::from_pool(pool, "b").await.unwrap();

    a.set(&cache_for("u1", &["x"])).await.unwrap();

    assert_eq!(a.get().await.unwrap().len(), 1);
    assert!(b.get().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_document_is_an_error() {
    let pool = pool().await;
    let store = SQLiteReservationStore::from_pool(pool.clone(), "siso")
        .await
        .unwrap();

    sqlx::query("INSERT INTO kv_store (namespace, value_json) VALUES ('siso', 'not json')")
        .execute(&pool)
        .await
        .unwrap();

    assert!(store.get().await.is_err());
}
