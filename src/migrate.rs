use anyhow::Result;
use sqlx::SqlitePool;

/// Create the schema. Idempotent: every statement is IF NOT EXISTS.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Metadata cache, keyed by flight ident
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS flight_cache (
            ident TEXT PRIMARY KEY,
            origin_code TEXT,
            origin_name TEXT,
            destination_code TEXT,
            destination_name TEXT,
            aircraft_type TEXT,
            seats_first INTEGER,
            seats_business INTEGER,
            seats_coach INTEGER,
            last_updated INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Negative cache of idents that failed resolution
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS missed_idents (
            ident TEXT PRIMARY KEY,
            last_attempted INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Append-only sightings log
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sightings (
            ident TEXT,
            hex TEXT,
            lat REAL,
            lon REAL,
            alt_ft INTEGER,
            distance_km REAL,
            rssi REAL,
            seen_seconds REAL,
            ts INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sightings_ts ON sightings(ts)")
        .execute(pool)
        .await?;

    Ok(())
}
