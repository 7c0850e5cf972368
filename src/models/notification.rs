use serde::{Deserialize, Serialize};

use super::record::Record;
use crate::push::PushMessage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub updated_at: i64,
    pub visible: bool,
}

impl Record for Notification {
    const SUFFIX: &'static str = ".notification.json";

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

impl Notification {
    /// Build a notification record from an inbound push message.
    pub fn from_push(message: PushMessage, received_at: i64) -> Self {
        Self {
            id: message.id,
            message: message.message,
            updated_at: received_at,
            visible: true,
        }
    }
}
