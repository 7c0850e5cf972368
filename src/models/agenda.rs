use serde::{Deserialize, Serialize};

use super::record::{default_visible, Record};
use super::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub id: String,
    pub title: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub category_id: String,
    pub category_name: String,
    pub image_url: Option<String>,
    pub updated_at: i64,
    pub visible: bool,
}

impl Record for AgendaItem {
    const SUFFIX: &'static str = ".agenda.json";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Wire shape of an Event table row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAgendaItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "start")]
    pub start_ms: i64,
    #[serde(rename = "end")]
    pub end_ms: i64,
    #[serde(rename = "categoryId")]
    pub category_id: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl AgendaItem {
    /// Join a raw event row with its resolved category.
    pub fn from_raw(raw: RawAgendaItem, category: &Category) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            start_ms: raw.start_ms,
            end_ms: raw.end_ms,
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            image_url: raw.image_url,
            updated_at: raw.updated_at,
            visible: raw.visible,
        }
    }
}
