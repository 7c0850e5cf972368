//! Data models for event-guide records.
//!
//! Each persisted entity implements [`Record`] and carries a unique id, an
//! updated-at timestamp (epoch millis) and a visibility flag. Raw wire
//! shapes (`Raw*` types) mirror the backend's camelCase payloads and are
//! converted into stored records during materialization.

pub mod agenda;
pub mod category;
pub mod location;
pub mod notification;
pub mod record;
pub mod sponsor;
pub mod survey;

pub use agenda::{AgendaItem, RawAgendaItem};
pub use category::Category;
pub use location::{Coordinates, Floor, LocationRecord, RawLocation};
pub use notification::Notification;
pub use record::Record;
pub use sponsor::{RawCompany, Sponsor};
pub use survey::{Question, Survey};
