use serde::{Deserialize, Serialize};

/// A category row from the Category table. Categories are cycle-scoped:
/// they live in the sync session's id map and are denormalized into agenda
/// and sponsor records at materialization time rather than persisted on
/// their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}
