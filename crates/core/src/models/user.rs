//! User profile model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An application-level user profile
///
/// The id is the stable identity issued by the session gateway; the
/// profile row mirrors it. `house_id` is `None` exactly when the user
/// belongs to no house.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub house_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: Uuid, email: Option<String>, display_name: Option<String>) -> Self {
        Self {
            id,
            email,
            display_name,
            house_id: None,
            created_at: Utc::now(),
        }
    }
}
