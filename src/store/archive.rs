//! Archive export: bundle every record file into a single artifact.
//!
//! Runs independently of sync. The bundle is one JSON document mapping file
//! name to record content, stamped with its creation time; binary assets are
//! left out.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{error, info};

use super::{RecordStore, StoreError};

/// Export all record files from `store` into one archive artifact inside
/// `dest_dir`. Returns the path of the written archive. Unreadable record
/// files are logged and skipped, consistent with bulk loads.
pub fn export(store: &RecordStore, dest_dir: &Path) -> Result<PathBuf, StoreError> {
    let entries = std::fs::read_dir(store.storage_dir()).map_err(|source| StoreError::Io {
        path: store.storage_dir().to_path_buf(),
        source,
    })?;

    let mut files = serde_json::Map::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.ends_with(".json") {
            continue;
        }

        let contents = match std::fs::read_to_string(entry.path()) {
            Ok(contents) => contents,
            Err(e) => {
                error!(file = name, error = %e, "Skipping unreadable file in archive");
                continue;
            }
        };
        match serde_json::from_str::<JsonValue>(&contents) {
            Ok(value) => {
                files.insert(name.to_string(), value);
            }
            Err(e) => {
                error!(file = name, error = %e, "Skipping corrupt file in archive");
            }
        }
    }

    let created_at = Utc::now().timestamp_millis();
    let archive = serde_json::json!({
        "created_at": created_at,
        "files": files,
    });

    std::fs::create_dir_all(dest_dir).map_err(|source| StoreError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;
    let dest = dest_dir.join(format!("guidecache-archive-{}.json", created_at));
    let payload = serde_json::to_vec_pretty(&archive).map_err(|source| StoreError::Parse {
        path: dest.clone(),
        source,
    })?;
    std::fs::write(&dest, payload).map_err(|source| StoreError::Io {
        path: dest.clone(),
        source,
    })?;

    info!(archive = %dest.display(), files = archive["files"].as_object().map(|m| m.len()).unwrap_or(0), "Archive exported");
    Ok(dest)
}
