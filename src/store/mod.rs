//! Storage abstraction for the display feeder.
//!
//! The [`Store`] trait owns the three persisted collections: the flight
//! metadata cache, the negative cache of missed idents, and the append-only
//! sightings log. The orchestrator only ever sees `&dyn Store`, so the
//! core logic runs unchanged against SQLite in production and the in-memory
//! backend in tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{FlightCacheEntry, MissedIdent, Sighting};

/// Abstract storage backend.
///
/// All keyed operations take a flight ident that has already been
/// normalized (trimmed, non-empty); callers must never pass an empty key.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert_cache_entry`](Store::upsert_cache_entry) | Insert or replace a metadata row by ident |
/// | [`get_cache_entry`](Store::get_cache_entry) | Look up cached metadata |
/// | [`record_miss`](Store::record_miss) | Upsert the negative-cache timestamp |
/// | [`get_miss`](Store::get_miss) | Look up the negative-cache row |
/// | [`insert_sighting`](Store::insert_sighting) | Append to the sightings log |
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace the metadata row for `entry.ident`.
    async fn upsert_cache_entry(&self, entry: &FlightCacheEntry) -> Result<()>;

    /// Look up the metadata row for an ident.
    async fn get_cache_entry(&self, ident: &str) -> Result<Option<FlightCacheEntry>>;

    /// Record a failed resolution attempt at `now` (epoch seconds),
    /// replacing any earlier attempt timestamp.
    async fn record_miss(&self, ident: &str, now: i64) -> Result<()>;

    /// Look up the negative-cache row for an ident. Freshness against the
    /// TTL is the caller's read-time predicate, not the store's.
    async fn get_miss(&self, ident: &str) -> Result<Option<MissedIdent>>;

    /// Append a sighting. Failures here must not take down the cycle's
    /// delivery duty; the orchestrator logs and moves on.
    async fn insert_sighting(&self, sighting: &Sighting) -> Result<()>;
}
