//! Identity gateway models
//!
//! Accounts and sessions live on the gateway side of the backend
//! boundary. Application tables never reference them directly; the only
//! thing that crosses the boundary is the user id carried by a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A credentialed account held by the local session gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// Name supplied at sign-up, used to seed the profile
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            display_name,
            created_at: Utc::now(),
        }
    }
}

/// Opaque bearer session for a signed-in account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: Uuid, duration_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at: now + chrono::Duration::hours(duration_hours),
        }
    }

    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}
