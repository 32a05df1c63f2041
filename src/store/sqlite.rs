//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation to a single SQL statement against the
//! schema created by [`crate::migrate`]. Every write is one atomic
//! insert-or-replace keyed by ident, which is what makes overlapping
//! cycles safe without extra locking.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::models::{FlightCacheEntry, MissedIdent, Sighting};

use super::Store;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert_cache_entry(&self, entry: &FlightCacheEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO flight_cache (ident, origin_code, origin_name,
                                      destination_code, destination_name, aircraft_type,
                                      seats_first, seats_business, seats_coach, last_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(ident) DO UPDATE SET
                origin_code = excluded.origin_code,
                origin_name = excluded.origin_name,
                destination_code = excluded.destination_code,
                destination_name = excluded.destination_name,
                aircraft_type = excluded.aircraft_type,
                seats_first = excluded.seats_first,
                seats_business = excluded.seats_business,
                seats_coach = excluded.seats_coach,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&entry.ident)
        .bind(&entry.origin_code)
        .bind(&entry.origin_name)
        .bind(&entry.destination_code)
        .bind(&entry.destination_name)
        .bind(&entry.aircraft_type)
        .bind(entry.seats_first)
        .bind(entry.seats_business)
        .bind(entry.seats_coach)
        .bind(entry.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_cache_entry(&self, ident: &str) -> Result<Option<FlightCacheEntry>> {
        let row = sqlx::query(
            r#"
            SELECT ident, origin_code, origin_name, destination_code, destination_name,
                   aircraft_type, seats_first, seats_business, seats_coach, last_updated
            FROM flight_cache
            WHERE ident = ?
            "#,
        )
        .bind(ident)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| FlightCacheEntry {
            ident: r.get("ident"),
            origin_code: r.get("origin_code"),
            origin_name: r.get("origin_name"),
            destination_code: r.get("destination_code"),
            destination_name: r.get("destination_name"),
            aircraft_type: r.get("aircraft_type"),
            seats_first: r.get("seats_first"),
            seats_business: r.get("seats_business"),
            seats_coach: r.get("seats_coach"),
            last_updated: r.get("last_updated"),
        }))
    }

    async fn record_miss(&self, ident: &str, now: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO missed_idents (ident, last_attempted)
            VALUES (?, ?)
            ON CONFLICT(ident) DO UPDATE SET last_attempted = excluded.last_attempted
            "#,
        )
        .bind(ident)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_miss(&self, ident: &str) -> Result<Option<MissedIdent>> {
        let row = sqlx::query("SELECT ident, last_attempted FROM missed_idents WHERE ident = ?")
            .bind(ident)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| MissedIdent {
            ident: r.get("ident"),
            last_attempted: r.get("last_attempted"),
        }))
    }

    async fn insert_sighting(&self, sighting: &Sighting) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sightings (ident, hex, lat, lon, alt_ft, distance_km,
                                   rssi, seen_seconds, ts)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sighting.ident)
        .bind(&sighting.hex)
        .bind(sighting.lat)
        .bind(sighting.lon)
        .bind(sighting.alt_ft)
        .bind(sighting.distance_km)
        .bind(sighting.rssi)
        .bind(sighting.seen_seconds)
        .bind(sighting.ts)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
