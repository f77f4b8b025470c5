//! House model - the shared household unit

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters an invite code is drawn from
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Invite code length
pub const INVITE_CODE_LEN: usize = 6;

/// A House groups members and their chores, expenses, and notes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct House {
    pub id: Uuid,
    pub name: String,
    /// Shared secret granting join access; matched exactly, case-sensitive
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl House {
    /// Create a house with a freshly generated invite code
    pub fn new(name: String, created_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            invite_code: generate_invite_code(),
            created_at: Utc::now(),
            created_by,
        }
    }
}

/// Generate a 6-character invite code drawn uniformly from `A-Z0-9`
///
/// Uniqueness is not guaranteed here; the store's UNIQUE constraint
/// rejects collisions and callers retry with a fresh code.
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}
