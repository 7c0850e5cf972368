//! The record store: one JSON file per record in a flat directory.
//!
//! File names derive deterministically from record id plus a type suffix,
//! so saves are idempotent overwrites (last write wins). Bulk loads filter
//! to visible records and skip corrupt files individually - one bad file
//! must never abort a batch.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::{
    AgendaItem, Coordinates, Floor, Notification, Question, Record, Sponsor, Survey,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Agenda bulk-load result, carrying the newest updated-at across the batch
/// so consumers can cheaply detect changes.
#[derive(Debug, Default)]
pub struct AgendaLoad {
    pub items: Vec<AgendaItem>,
    pub latest_updated: i64,
}

pub struct RecordStore {
    storage_dir: PathBuf,
}

impl RecordStore {
    pub fn new(storage_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&storage_dir).map_err(|source| StoreError::Io {
            path: storage_dir.clone(),
            source,
        })?;
        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn record_path<T: Record>(&self, id: &str) -> PathBuf {
        self.storage_dir.join(format!("{}{}", id, T::SUFFIX))
    }

    /// Persist one record, overwriting any previous file. Best-effort: an
    /// I/O failure is logged and the write is considered lost.
    pub fn save<T: Record>(&self, record: &T) {
        let path = self.record_path::<T>(record.id());
        let contents = match serde_json::to_string_pretty(record) {
            Ok(contents) => contents,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to serialize record");
                return;
            }
        };
        if let Err(e) = std::fs::write(&path, contents) {
            error!(path = %path.display(), error = %e, "Failed to write record");
        }
    }

    fn load_path<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_path_buf())
            } else {
                StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load exactly one record by id.
    pub fn load<T: Record>(&self, id: &str) -> Result<T, StoreError> {
        Self::load_path(&self.record_path::<T>(id))
    }

    /// Load every visible record of a type. Corrupt files are logged and
    /// skipped; order is not guaranteed.
    pub fn load_all<T: Record>(&self) -> Vec<T> {
        let entries = match std::fs::read_dir(&self.storage_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %self.storage_dir.display(), error = %e, "Failed to list storage directory");
                return Vec::new();
            }
        };

        let mut loaded = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(T::SUFFIX) {
                continue;
            }
            match Self::load_path::<T>(&entry.path()) {
                Ok(record) => {
                    if record.is_visible() {
                        loaded.push(record);
                    }
                }
                Err(e) => {
                    error!(file = name, error = %e, "Skipping unreadable record");
                }
            }
        }
        loaded
    }

    // ===== Typed load wrappers =====

    pub fn load_agenda(&self) -> AgendaLoad {
        let items = self.load_all::<AgendaItem>();
        let latest_updated = items.iter().map(|i| i.updated_at).max().unwrap_or(0);
        AgendaLoad {
            items,
            latest_updated,
        }
    }

    pub fn load_agenda_item(&self, id: &str) -> Result<AgendaItem, StoreError> {
        self.load(id)
    }

    pub fn load_sponsors(&self) -> Vec<Sponsor> {
        self.load_all()
    }

    pub fn load_notifications(&self) -> Vec<Notification> {
        self.load_all()
    }

    pub fn load_surveys(&self) -> Vec<Survey> {
        self.load_all()
    }

    /// Load questions by id, skipping and logging individual misses.
    pub fn load_questions(&self, ids: &[String]) -> Vec<Question> {
        let mut questions = Vec::with_capacity(ids.len());
        for id in ids {
            match self.load::<Question>(id) {
                Ok(question) => questions.push(question),
                Err(e) => error!(id = %id, error = %e, "Failed to load question"),
            }
        }
        questions
    }

    pub fn load_coordinates(&self) -> Vec<Coordinates> {
        let mut coords = self.load_all::<Coordinates>();
        coords.sort_by_key(|c| c.position);
        coords
    }

    pub fn load_floors(&self) -> Vec<Floor> {
        let mut floors = self.load_all::<Floor>();
        floors.sort_by_key(|f| f.position);
        floors
    }

    // ===== Binary asset paths =====

    /// Deterministic path for a sponsor's logo. Not routed through JSON.
    pub fn logo_file(&self, sponsor_id: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.png", sponsor_id))
    }

    /// Deterministic path for an entity's downloaded image.
    pub fn image_file(&self, entity_id: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.png", entity_id))
    }

    // ===== Purge =====

    /// True for data-derived cached files; permanent binary assets stay.
    fn purge_matches(name: &str) -> bool {
        name.ends_with(".json")
    }

    /// Delete every data-derived file. Files are renamed before deletion:
    /// deleting a file still open for writing raises EBUSY on some mobile
    /// filesystems, and the rename sidesteps that. A save racing this purge
    /// can still slip a fresh file in after the scan; that window is
    /// accepted and the file is caught by the next purge.
    pub fn purge(&self) {
        let entries = match std::fs::read_dir(&self.storage_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %self.storage_dir.display(), error = %e, "Failed to list storage directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !Self::purge_matches(name) {
                continue;
            }

            let path = entry.path();
            let renamed = self
                .storage_dir
                .join(format!("{}.{}", Utc::now().timestamp_millis(), name));

            if let Err(e) = std::fs::rename(&path, &renamed) {
                error!(path = %path.display(), error = %e, "Failed to rename for purge");
                continue;
            }
            if let Err(e) = std::fs::remove_file(&renamed) {
                error!(path = %renamed.display(), error = %e, "Failed to delete purged file");
                continue;
            }
            debug!(path = %path.display(), "Deleted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, RawCompany};

    fn store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn sponsor(id: &str, visible: bool) -> Sponsor {
        Sponsor {
            id: id.to_string(),
            name: format!("Sponsor {}", id),
            category_id: "c1".to_string(),
            category_name: "Gold".to_string(),
            logo_url: Some(format!("https://cdn.example/{}.png", id)),
            updated_at: 1000,
            visible,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let original = sponsor("s1", true);
        store.save(&original);

        let loaded: Sponsor = store.load("s1").unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn load_missing_is_not_found() {
        let (_dir, store) = store();
        match store.load::<Sponsor>("nope") {
            Err(StoreError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|s| s.id)),
        }
    }

    #[test]
    fn load_corrupt_is_parse_error() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("bad.sponsor.json"), b"{ nope").unwrap();
        match store.load::<Sponsor>("bad") {
            Err(StoreError::Parse { .. }) => {}
            other => panic!("expected Parse, got {:?}", other.map(|s| s.id)),
        }
    }

    #[test]
    fn load_all_filters_invisible_and_skips_corrupt() {
        let (dir, store) = store();
        store.save(&sponsor("s1", true));
        store.save(&sponsor("s2", false));
        std::fs::write(dir.path().join("junk.sponsor.json"), b"not json").unwrap();

        let loaded = store.load_sponsors();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "s1");
    }

    #[test]
    fn save_overwrites_existing_record() {
        let (_dir, store) = store();
        store.save(&sponsor("s1", true));

        let mut updated = sponsor("s1", true);
        updated.name = "Renamed".to_string();
        updated.updated_at = 2000;
        store.save(&updated);

        let loaded: Sponsor = store.load("s1").unwrap();
        assert_eq!(loaded.name, "Renamed");
        assert_eq!(loaded.updated_at, 2000);
    }

    #[test]
    fn coordinates_and_floors_sorted_by_position() {
        let (_dir, store) = store();
        for (id, position) in [("c2", 2), ("c0", 0), ("c1", 1)] {
            store.save(&Coordinates {
                id: id.to_string(),
                latitude: 1.0,
                longitude: 2.0,
                position,
                updated_at: 1,
                visible: true,
            });
        }

        let loaded = store.load_coordinates();
        let order: Vec<i64> = loaded.iter().map(|c| c.position).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn agenda_load_reports_latest_updated() {
        let (_dir, store) = store();
        let category = Category {
            id: "c1".to_string(),
            name: "General".to_string(),
        };
        for (id, updated_at) in [("a1", 10), ("a2", 30), ("a3", 20)] {
            let raw: crate::models::RawAgendaItem = serde_json::from_value(serde_json::json!({
                "id": id, "title": "t", "start": 1, "end": 2,
                "categoryId": "c1", "updatedAt": updated_at,
            }))
            .unwrap();
            store.save(&AgendaItem::from_raw(raw, &category));
        }

        let load = store.load_agenda();
        assert_eq!(load.items.len(), 3);
        assert_eq!(load.latest_updated, 30);
    }

    #[test]
    fn purge_removes_records_but_keeps_assets() {
        let (dir, store) = store();
        store.save(&sponsor("s1", true));
        store.save(&sponsor("s2", false));
        std::fs::write(store.logo_file("s1"), b"\x89PNG").unwrap();

        store.purge();

        let remaining: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(remaining, vec!["s1.png".to_string()]);
    }

    #[test]
    fn invisible_record_stays_on_disk() {
        let (dir, store) = store();
        store.save(&sponsor("s2", false));
        assert!(store.load_sponsors().is_empty());
        assert!(dir.path().join("s2.sponsor.json").exists());
    }

    #[test]
    fn questions_load_by_id_skipping_misses() {
        let (_dir, store) = store();
        let question = Question {
            id: "q1".to_string(),
            title: "How was the keynote?".to_string(),
            answers: vec!["Great".to_string(), "Fine".to_string()],
            updated_at: 1,
            visible: true,
        };
        store.save(&question);
        store.save(&Survey {
            id: "sv1".to_string(),
            title: "Day 1".to_string(),
            question_ids: vec!["q1".to_string(), "q-missing".to_string()],
            updated_at: 1,
            visible: true,
        });

        let surveys = store.load_surveys();
        assert_eq!(surveys.len(), 1);

        let questions = store.load_questions(&surveys[0].question_ids);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0], question);
    }

    #[test]
    fn raw_company_join_round_trips_through_store() {
        let (_dir, store) = store();
        let raw: RawCompany = serde_json::from_value(serde_json::json!({
            "id": "co1", "name": "Acme", "categoryId": "c9",
            "logoUrl": "https://cdn.example/co1.png", "updatedAt": 77,
        }))
        .unwrap();
        let category = Category {
            id: "c9".to_string(),
            name: "Platinum".to_string(),
        };

        store.save(&Sponsor::from_raw(raw, &category));
        let loaded: Sponsor = store.load("co1").unwrap();
        assert_eq!(loaded.category_name, "Platinum");
        assert_eq!(loaded.updated_at, 77);
    }
}
