//! # Overhead
//!
//! A closest-aircraft display feeder for ADS-B receivers.
//!
//! Overhead polls a dump1090-style aircraft feed on a fixed period, picks
//! the position report closest to the receiver (gated by freshness and
//! accuracy, with a 0.1 km distance tie-break), logs the sighting, looks
//! up cached route/seat metadata for the flight ident, and PUTs an
//! enriched summary to a downstream display endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌───────────┐   ┌──────────────┐
//! │ ReportSource │──▶│  Selector  │──▶│   Cycle   │──▶│ DisplaySink  │
//! │ (dump1090)   │   │ (haversine)│   │orchestrator│   │ (HTTP PUT)   │
//! └──────────────┘   └────────────┘   └─────┬─────┘   └──────────────┘
//!                                           │
//!                                           ▼
//!                                     ┌───────────┐
//!                                     │   Store   │
//!                                     │  (SQLite) │
//!                                     └───────────┘
//! ```
//!
//! The store keeps three collections: a per-ident metadata cache (today
//! only ever stub rows; pre-wired for a future enrichment call), a
//! negative cache of idents that failed resolution, and an append-only
//! sightings log.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`geo`] | Great-circle distance |
//! | [`selector`] | Closest-candidate selection |
//! | [`source`] | Aircraft feed acquisition |
//! | [`sink`] | Display payload delivery |
//! | [`cycle`] | Per-tick orchestration and the poll loop |
//! | [`store`] | Storage trait and backends |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod cycle;
pub mod db;
pub mod geo;
pub mod migrate;
pub mod models;
pub mod selector;
pub mod sink;
pub mod source;
pub mod store;
