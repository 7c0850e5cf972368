//! Push-message plumbing.
//!
//! Inbound push messages become [`crate::models::Notification`] records.
//! Backend registration of the device token is a small subflow independent
//! of the table state machine: it runs on sync requests when no registration
//! is recorded and a token is available.

use serde::{Deserialize, Serialize};

/// An inbound push message as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub id: String,
    pub message: String,
}
