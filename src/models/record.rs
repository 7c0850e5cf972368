use serde::{de::DeserializeOwned, Serialize};

/// A persisted entity: one JSON file per record, named `<id><SUFFIX>` inside
/// the storage directory. Ids are unique within a suffix's namespace.
pub trait Record: Serialize + DeserializeOwned {
    /// File-name suffix identifying this record type.
    const SUFFIX: &'static str;

    fn id(&self) -> &str;

    /// Epoch millis of the last backend update.
    fn updated_at(&self) -> i64;

    /// Invisible records stay on disk but are excluded from bulk loads.
    fn is_visible(&self) -> bool;
}

/// serde default for the wire `visible` flag, which is omitted when true.
pub(crate) fn default_visible() -> bool {
    true
}
