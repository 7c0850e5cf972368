use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::error;

use crate::models::Category;

/// Transient staging for one sync cycle.
///
/// Company and Event payloads wait here until the category map is loaded;
/// the `request_made` flag stops a second Category fetch when both arrive
/// before Category does. `reset` clears the staged payloads and the flag but
/// not the categories - those are a cycle-spanning cache, replaced whenever
/// a Category response arrives.
#[derive(Debug, Default)]
pub struct SyncSession {
    categories: Option<HashMap<String, Category>>,
    sponsor_data: Option<Vec<JsonValue>>,
    agenda_data: Option<Vec<JsonValue>>,
    request_made: bool,
}

impl SyncSession {
    pub fn reset(&mut self) {
        self.sponsor_data = None;
        self.agenda_data = None;
        self.request_made = false;
    }

    /// Parse an array of category payloads into the id map, replacing prior
    /// entries with matching ids. Malformed entries are logged and skipped.
    pub fn load_categories(&mut self, raw: &[JsonValue]) {
        let map = self.categories.get_or_insert_with(HashMap::new);
        for value in raw {
            match serde_json::from_value::<Category>(value.clone()) {
                Ok(category) => {
                    map.insert(category.id.clone(), category);
                }
                Err(e) => error!(error = %e, "Skipping malformed category"),
            }
        }
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.as_ref().and_then(|map| map.get(id))
    }

    pub fn categories_loaded(&self) -> bool {
        self.categories.is_some()
    }

    pub fn set_sponsor_data(&mut self, data: Vec<JsonValue>) {
        self.sponsor_data = Some(data);
    }

    pub fn take_sponsor_data(&mut self) -> Option<Vec<JsonValue>> {
        self.sponsor_data.take()
    }

    pub fn set_agenda_data(&mut self, data: Vec<JsonValue>) {
        self.agenda_data = Some(data);
    }

    pub fn take_agenda_data(&mut self) -> Option<Vec<JsonValue>> {
        self.agenda_data.take()
    }

    /// A staged payload may be materialized only once categories are loaded.
    pub fn is_sponsor_ready(&self) -> bool {
        self.sponsor_data.is_some() && self.categories_loaded()
    }

    pub fn is_agenda_ready(&self) -> bool {
        self.agenda_data.is_some() && self.categories_loaded()
    }

    pub fn request_made(&self) -> bool {
        self.request_made
    }

    pub fn set_request_made(&mut self, made: bool) {
        self.request_made = made;
    }
}
