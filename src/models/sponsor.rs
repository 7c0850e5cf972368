use serde::{Deserialize, Serialize};

use super::record::{default_visible, Record};
use super::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub category_name: String,
    pub logo_url: Option<String>,
    pub updated_at: i64,
    pub visible: bool,
}

impl Record for Sponsor {
    const SUFFIX: &'static str = ".sponsor.json";

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

/// Wire shape of a Company table row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCompany {
    pub id: String,
    pub name: String,
    #[serde(rename = "categoryId")]
    pub category_id: String,
    #[serde(rename = "logoUrl")]
    pub logo_url: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl Sponsor {
    /// Join a raw company row with its resolved category.
    pub fn from_raw(raw: RawCompany, category: &Category) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            logo_url: raw.logo_url,
            updated_at: raw.updated_at,
            visible: raw.visible,
        }
    }
}
