//! In-memory [`Store`] implementation for testing.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock` for thread safety.
//! Operations return immediately-ready futures.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{FlightCacheEntry, MissedIdent, Sighting};

use super::Store;

/// In-memory store, suitable for exercising the full cycle in tests.
#[derive(Default)]
pub struct InMemoryStore {
    cache: RwLock<HashMap<String, FlightCacheEntry>>,
    misses: RwLock<HashMap<String, MissedIdent>>,
    sightings: RwLock<Vec<Sighting>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of metadata cache rows.
    pub fn cache_len(&self) -> usize {
        self.cache.read().unwrap().len()
    }

    /// Number of negative-cache rows.
    pub fn miss_len(&self) -> usize {
        self.misses.read().unwrap().len()
    }

    /// Snapshot of the sightings log, in insertion order.
    pub fn sightings(&self) -> Vec<Sighting> {
        self.sightings.read().unwrap().clone()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn upsert_cache_entry(&self, entry: &FlightCacheEntry) -> Result<()> {
        self.cache
            .write()
            .unwrap()
            .insert(entry.ident.clone(), entry.clone());
        Ok(())
    }

    async fn get_cache_entry(&self, ident: &str) -> Result<Option<FlightCacheEntry>> {
        Ok(self.cache.read().unwrap().get(ident).cloned())
    }

    async fn record_miss(&self, ident: &str, now: i64) -> Result<()> {
        self.misses.write().unwrap().insert(
            ident.to_string(),
            MissedIdent {
                ident: ident.to_string(),
                last_attempted: now,
            },
        );
        Ok(())
    }

    async fn get_miss(&self, ident: &str) -> Result<Option<MissedIdent>> {
        Ok(self
            .misses
            .read()
            .unwrap()
            .get(ident)
            .cloned())
    }

    async fn insert_sighting(&self, sighting: &Sighting) -> Result<()> {
        self.sightings
            .write()
            .unwrap()
            .push(sighting.clone());
        Ok(())
    }
}
