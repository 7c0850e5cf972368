use serde::{Deserialize, Serialize};

use super::record::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: String,
    pub title: String,
    pub question_ids: Vec<String>,
    pub updated_at: i64,
    pub visible: bool,
}

impl Record for Survey {
    const SUFFIX: &'static str = ".survey.json";

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
pub struct Question {
    pub id: String,
    pub title: String,
    pub answers: Vec<String>,
    pub updated_at: i64,
    pub visible: bool,
}

impl Record for Question {
    const SUFFIX: &'static str = ".question.json";

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
