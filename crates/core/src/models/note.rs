//! Note model

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shared household note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub house_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub tags: BTreeSet<String>,
}

impl Note {
    pub fn new(house_id: Uuid, created_by: Uuid, title: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            house_id,
            created_by,
            created_at: Utc::now(),
            is_pinned: false,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Case-insensitive match against title, content, or any tag
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_searches_title_content_and_tags() {
        let note = Note::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Shopping list".to_string(),
            "Milk and eggs".to_string(),
        )
        .with_tags(BTreeSet::from(["groceries".to_string()]));

        assert!(note.matches("shopping"));
        assert!(note.matches("MILK"));
        assert!(note.matches("grocer"));
        assert!(!note.matches("rent"));
    }
}
