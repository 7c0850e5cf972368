//! Location table records.
//!
//! The Location table carries two record kinds distinguished only by payload
//! shape: rows with latitude/longitude become [`Coordinates`], rows with an
//! image-data field become [`Floor`]. Rows with neither are ambiguous and
//! dropped by the sync engine.

use serde::{Deserialize, Serialize};

use super::record::{default_visible, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub position: i64,
    pub updated_at: i64,
    pub visible: bool,
}

impl Record for Coordinates {
    const SUFFIX: &'static str = ".coords.json";

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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,
    pub image_url: String,
    pub position: i64,
    pub updated_at: i64,
    pub visible: bool,
}

impl Record for Floor {
    const SUFFIX: &'static str = ".floor.json";

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

/// Wire shape of a Location table row before disambiguation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "imageData")]
    pub image_data: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

/// Result of classifying one Location row by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRecord {
    Coordinates(Coordinates),
    Floor(Floor),
    Ambiguous { id: String },
}

impl RawLocation {
    pub fn classify(self) -> LocationRecord {
        match (self.latitude, self.longitude, self.image_data) {
            (Some(latitude), Some(longitude), _) => LocationRecord::Coordinates(Coordinates {
                id: self.id,
                latitude,
                longitude,
                position: self.position,
                updated_at: self.updated_at,
                visible: self.visible,
            }),
            (_, _, Some(image_url)) => LocationRecord::Floor(Floor {
                id: self.id,
                image_url,
                position: self.position,
                updated_at: self.updated_at,
                visible: self.visible,
            }),
            _ => LocationRecord::Ambiguous { id: self.id },
        }
    }
}
