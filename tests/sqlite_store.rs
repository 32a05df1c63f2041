//! SQLite store tests against a temporary database file.

use sqlx::Row;
use tempfile::TempDir;

use overhead::config::DbConfig;
use overhead::db;
use overhead::migrate;
use overhead::models::{FlightCacheEntry, Sighting};
use overhead::store::sqlite::SqliteStore;
use overhead::store::Store;

async fn temp_store() -> (TempDir, SqliteStore) {
    let tmp = TempDir::new().unwrap();
    let cfg = DbConfig {
        path: tmp.path().join("data").join("flightcache.db"),
    };
    let pool = db::connect(&cfg).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    (tmp, SqliteStore::new(pool))
}

fn full_entry(now: i64) -> FlightCacheEntry {
    FlightCacheEntry {
        ident: "ASA123".to_string(),
        origin_code: Some("SEA".to_string()),
        origin_name: Some("Seattle-Tacoma Intl".to_string()),
        destination_code: Some("LAX".to_string()),
        destination_name: Some("Los Angeles Intl".to_string()),
        aircraft_type: Some("B739".to_string()),
        seats_first: Some(16),
        seats_business: Some(24),
        seats_coach: Some(144),
        last_updated: now,
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let tmp = TempDir::new().unwrap();
    let cfg = DbConfig {
        path: tmp.path().join("flightcache.db"),
    };
    let pool = db::connect(&cfg).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
}

#[tokio::test]
async fn cache_entry_roundtrip() {
    let (_tmp, store) = temp_store().await;

    assert!(store.get_cache_entry("ASA123").await.unwrap().is_none());

    let entry = full_entry(1_700_000_000);
    store.upsert_cache_entry(&entry).await.unwrap();

    let got = store.get_cache_entry("ASA123").await.unwrap().unwrap();
    assert_eq!(got, entry);
}

#[tokio::test]
async fn upsert_replaces_existing_row() {
    let (_tmp, store) = temp_store().await;

    store
        .upsert_cache_entry(&FlightCacheEntry::stub("ASA123", 100))
        .await
        .unwrap();
    store
        .upsert_cache_entry(&full_entry(200))
        .await
        .unwrap();

    let got = store.get_cache_entry("ASA123").await.unwrap().unwrap();
    assert_eq!(got.origin_code.as_deref(), Some("SEA"));
    assert_eq!(got.last_updated, 200);

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM flight_cache")
        .fetch_one(store.pool())
        .await
        .unwrap()
        .get("n");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn stub_entry_stores_all_nulls() {
    let (_tmp, store) = temp_store().await;

    store
        .upsert_cache_entry(&FlightCacheEntry::stub("UAL9", 300))
        .await
        .unwrap();

    let got = store.get_cache_entry("UAL9").await.unwrap().unwrap();
    assert_eq!(got, FlightCacheEntry::stub("UAL9", 300));
}

#[tokio::test]
async fn miss_upsert_and_lookup() {
    let (_tmp, store) = temp_store().await;

    assert!(store.get_miss("ASA123").await.unwrap().is_none());

    store.record_miss("ASA123", 500).await.unwrap();
    store.record_miss("ASA123", 900).await.unwrap();

    let miss = store.get_miss("ASA123").await.unwrap().unwrap();
    assert_eq!(miss.ident, "ASA123");
    assert_eq!(miss.last_attempted, 900);

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM missed_idents")
        .fetch_one(store.pool())
        .await
        .unwrap()
        .get("n");
    assert_eq!(count, 1);

    // Keys are case-sensitive.
    assert!(store.get_miss("asa123").await.unwrap().is_none());
}

#[tokio::test]
async fn sightings_append_only() {
    let (_tmp, store) = temp_store().await;

    let sighting = Sighting {
        ident: Some("ASA123".to_string()),
        hex: Some("a1b2c3".to_string()),
        lat: 47.61,
        lon: -122.30,
        alt_ft: Some(12000),
        distance_km: 2.52,
        rssi: Some(-20.1),
        seen_seconds: Some(1.4),
        ts: 1_700_000_000,
    };
    store.insert_sighting(&sighting).await.unwrap();

    // Identless sightings are legal rows.
    let anonymous = Sighting {
        ident: None,
        hex: None,
        lat: 47.62,
        lon: -122.31,
        alt_ft: None,
        distance_km: 3.1,
        rssi: None,
        seen_seconds: None,
        ts: 1_700_000_060,
    };
    store.insert_sighting(&anonymous).await.unwrap();

    let rows = sqlx::query("SELECT ident, hex, distance_km FROM sightings ORDER BY ts")
        .fetch_all(store.pool())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get::<Option<String>, _>("ident").as_deref(), Some("ASA123"));
    assert_eq!(rows[1].get::<Option<String>, _>("ident"), None);
    assert_eq!(rows[1].get::<Option<String>, _>("hex"), None);
}
