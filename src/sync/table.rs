use std::fmt;

use serde_json::Value as JsonValue;

/// A remote data table with its own sync cadence. Per-table metadata (prefs
/// key, endpoint path) lives in lookup methods rather than on enum state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Config,
    Company,
    Category,
    Location,
    Event,
}

impl Table {
    /// Interval-gated tables checked on each data cycle, in due-check order.
    /// Config is special-cased ahead of these, Category is fetched only as a
    /// join dependency.
    pub const SYNCED: [Table; 3] = [Table::Event, Table::Location, Table::Company];

    /// Well-known prefs key holding this table's last-sync timestamp.
    pub fn prefs_key(self) -> &'static str {
        match self {
            Table::Config => "last_sync_config",
            Table::Company => "last_sync_company",
            Table::Category => "last_sync_category",
            Table::Location => "last_sync_location",
            Table::Event => "last_sync_event",
        }
    }

    /// Endpoint path under the backend base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Table::Config => "config",
            Table::Company => "companies",
            Table::Category => "categories",
            Table::Location => "locations",
            Table::Event => "events",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outbound fetch request: the transport resolves the endpoint from the
/// table tag and returns the payload tagged with the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub table: Table,
}

/// A parsed response payload tagged with its table. A well-formed payload
/// carries a `results` array; its absence is an error condition distinct
/// from an empty array.
#[derive(Debug, Clone)]
pub struct TableResponse {
    pub table: Table,
    pub payload: JsonValue,
}
