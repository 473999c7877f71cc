use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Platform;

/// A show. Its owner is the authority for every draft and episode check.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Podcast {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    /// Show identifier on each external platform
    #[schema(value_type = Object)]
    pub external_show_ids: HashMap<Platform, String>,
    pub created_at: DateTime<Utc>,
}

impl Podcast {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Show reference handed to an adapter; falls back to the podcast id
    pub fn show_ref_for(&self, platform: Platform) -> String {
        self.external_show_ids
            .get(&platform)
            .cloned()
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_ref_falls_back_to_podcast_id() {
        let mut podcast = Podcast {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Castline Weekly".to_string(),
            external_show_ids: HashMap::new(),
            created_at: Utc::now(),
        };
        assert_eq!(podcast.show_ref_for(Platform::Apple), podcast.id.to_string());

        podcast
            .external_show_ids
            .insert(Platform::Apple, "apple-show-42".to_string());
        assert_eq!(podcast.show_ref_for(Platform::Apple), "apple-show-42");
    }
}
