pub mod archive;
pub mod records;

pub use records::{AgendaLoad, RecordStore, StoreError};
