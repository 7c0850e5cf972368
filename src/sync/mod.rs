//! Table-scoped sync with dependency ordering.
//!
//! [`engine::SyncEngine`] drives the per-table state machine; raw responses
//! enter through [`engine::SyncEngine::handle_response`] on a single
//! consumer, staging lives in [`session::SyncSession`], and
//! [`runner`] wires the engine to the transport with spawned fetch tasks.

pub mod engine;
pub mod runner;
pub mod session;
pub mod table;

pub use engine::{SyncEngine, SyncEvent};
pub use session::SyncSession;
pub use table::{FetchRequest, Table, TableResponse};
