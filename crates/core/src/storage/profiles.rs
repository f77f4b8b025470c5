//! User profile storage operations

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, parse_uuid_opt, OptionalExt};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::UserProfile;

pub struct ProfileStore<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a profile row
    ///
    /// A row that already exists (concurrent resolver) surfaces as a
    /// typed conflict so callers can fall through to a re-fetch.
    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub fn create(&self, profile: &UserProfile) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO users (id, email, display_name, house_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    profile.id.to_string(),
                    profile.email,
                    profile.display_name,
                    profile.house_id.map(|id| id.to_string()),
                    profile.created_at.to_rfc3339(),
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    Error::Conflict(format!("profile {} already exists", profile.id))
                } else {
                    Error::Database(err)
                }
            })?;
        Ok(())
    }

    /// Find profile by user id
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, display_name, house_id, created_at FROM users WHERE id = ?1",
        )?;

        let profile = stmt
            .query_row(params![id.to_string()], |row| {
                Ok(UserProfile {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    email: row.get(1)?,
                    display_name: row.get(2)?,
                    house_id: parse_uuid_opt(row.get::<_, Option<String>>(3)?)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?)?,
                })
            })
            .optional()?;

        Ok(profile)
    }

    /// Update the display name
    #[instrument(skip(self))]
    pub fn update_display_name(&self, id: Uuid, display_name: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE users SET display_name = ?1 WHERE id = ?2",
            params![display_name, id.to_string()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("profile {id}")));
        }
        Ok(())
    }

    /// Set or clear the house a user belongs to
    #[instrument(skip(self))]
    pub fn set_house(&self, id: Uuid, house_id: Option<Uuid>) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE users SET house_id = ?1 WHERE id = ?2",
            params![house_id.map(|h| h.to_string()), id.to_string()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("profile {id}")));
        }
        Ok(())
    }

    /// List profiles belonging to a house, oldest member first
    #[instrument(skip(self))]
    pub fn list_for_house(&self, house_id: Uuid) -> Result<Vec<UserProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, display_name, house_id, created_at FROM users
             WHERE house_id = ?1 ORDER BY created_at ASC",
        )?;

        let profiles = stmt
            .query_map(params![house_id.to_string()], |row| {
                Ok(UserProfile {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    email: row.get(1)?,
                    display_name: row.get(2)?,
                    house_id: parse_uuid_opt(row.get::<_, Option<String>>(3)?)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Database;
    use crate::models::{House, UserProfile};
    use uuid::Uuid;

    #[test]
    fn create_and_find_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let profile = UserProfile::new(
            Uuid::new_v4(),
            Some("ada@example.com".to_string()),
            Some("Ada".to_string()),
        );
        db.profiles().create(&profile).unwrap();

        let found = db.profiles().find_by_id(profile.id).unwrap().unwrap();
        assert_eq!(found.email.as_deref(), Some("ada@example.com"));
        assert_eq!(found.display_name.as_deref(), Some("Ada"));
        assert_eq!(found.house_id, None);
    }

    #[test]
    fn duplicate_profile_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        let profile = UserProfile::new(Uuid::new_v4(), None, None);
        db.profiles().create(&profile).unwrap();

        let err = db.profiles().create(&profile).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn set_house_roundtrip_and_membership_listing() {
        let db = Database::open_in_memory().unwrap();
        let owner = UserProfile::new(Uuid::new_v4(), None, Some("Owner".to_string()));
        let other = UserProfile::new(Uuid::new_v4(), None, Some("Other".to_string()));
        db.profiles().create(&owner).unwrap();
        db.profiles().create(&other).unwrap();

        let house = House::new("Test House".to_string(), owner.id);
        db.houses().create(&house).unwrap();

        db.profiles().set_house(owner.id, Some(house.id)).unwrap();
        db.profiles().set_house(other.id, Some(house.id)).unwrap();

        let members = db.profiles().list_for_house(house.id).unwrap();
        assert_eq!(members.len(), 2);

        db.profiles().set_house(other.id, None).unwrap();
        let members = db.profiles().list_for_house(house.id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, owner.id);
    }

    #[test]
    fn updates_on_missing_profile_are_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .profiles()
            .update_display_name(Uuid::new_v4(), "Ghost")
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::NotFound(_)));
    }
}
