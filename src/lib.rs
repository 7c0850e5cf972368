//! guidecache - a local sync and cache engine for event-guide data.
//!
//! Keeps a device-resident store of per-record JSON files consistent with a
//! remote backend using interval-gated, table-scoped sync. Company and Event
//! tables join against the Category table before their records are
//! materialized; the Location table splits into coordinate and floor records
//! by payload shape.

pub mod api;
pub mod config;
pub mod models;
pub mod prefs;
pub mod push;
pub mod store;
pub mod sync;
