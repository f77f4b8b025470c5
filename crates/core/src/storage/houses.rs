//! House storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::House;

pub struct HouseStore<'a> {
    conn: &'a Connection,
}

fn row_to_house(row: &Row<'_>) -> std::result::Result<House, rusqlite::Error> {
    Ok(House {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        name: row.get(1)?,
        invite_code: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?)?,
        created_by: parse_uuid(&row.get::<_, String>(4)?)?,
    })
}

impl<'a> HouseStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a house row
    ///
    /// The UNIQUE constraint on invite_code turns a collision into a
    /// typed conflict; callers regenerate the code and retry.
    #[instrument(skip(self, house), fields(house_id = %house.id))]
    pub fn create(&self, house: &House) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO houses (id, name, invite_code, created_at, created_by) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    house.id.to_string(),
                    house.name,
                    house.invite_code,
                    house.created_at.to_rfc3339(),
                    house.created_by.to_string(),
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    Error::Conflict(format!("invite code {} is already taken", house.invite_code))
                } else {
                    Error::Database(err)
                }
            })?;
        Ok(())
    }

    /// Find house by id
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<House>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, invite_code, created_at, created_by FROM houses WHERE id = ?1",
        )?;

        let house = stmt
            .query_row(params![id.to_string()], row_to_house)
            .optional()?;

        Ok(house)
    }

    /// Find house by invite code (exact, case-sensitive)
    #[instrument(skip(self))]
    pub fn find_by_code(&self, invite_code: &str) -> Result<Option<House>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, invite_code, created_at, created_by FROM houses WHERE invite_code = ?1 LIMIT 1",
        )?;

        let house = stmt
            .query_row(params![invite_code], row_to_house)
            .optional()?;

        Ok(house)
    }
}
